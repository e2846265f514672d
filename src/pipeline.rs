use crate::align::{AlignEvent, AlignerTuning};
use crate::calibrate::Calibration;
use crate::config::SiteConfig;
use crate::error::SyncError;
use crate::export::{export_word_timing, WordTimingFile};
use crate::markup::{annotate, is_annotated, unwrap_markers};
use crate::report::{ChapterStats, ChapterStatus};
use crate::transcript::Transcript;
use crate::validate::{validate_sync, Tolerance};

/// Options shared by the per-chapter operations.
#[derive(Debug, Clone, Default)]
pub struct ChapterOptions {
    pub dry_run: bool,
    pub force: bool,
    pub tuning: AlignerTuning,
    pub tolerance: Tolerance,
}

/// Annotate one chapter's reading page against its transcript.
pub fn annotate_chapter(
    cfg: &SiteConfig,
    chapter: u32,
    opts: &ChapterOptions,
) -> Result<ChapterStats, SyncError> {
    let page_path = cfg.read_page_path(chapter)?;
    let transcript = Transcript::load(&cfg.transcript_path(chapter), chapter)?;
    let words = transcript.words();

    let mut html = std::fs::read_to_string(&page_path)
        .map_err(|e| SyncError::io("read reading page", e))?;

    if is_annotated(&html) {
        if !opts.force {
            let mut stats = ChapterStats::new(chapter, ChapterStatus::AlreadyAnnotated);
            stats.push_note("already annotated; use --force to re-annotate".to_string());
            return Ok(stats);
        }
        html = unwrap_markers(&html);
    }

    let annotated = annotate(&html, &words, opts.tuning.clone());

    let status = if opts.dry_run {
        ChapterStatus::WouldAnnotate
    } else {
        std::fs::write(&page_path, &annotated.html)
            .map_err(|e| SyncError::io("write reading page", e))?;
        ChapterStatus::Annotated
    };

    let mut stats = ChapterStats::new(chapter, status);
    stats.transcript_words = words.len();
    stats.wrapped = annotated.wrapped;
    stats.unmatched = annotated.result.unmatched_count();
    stats.resyncs = annotated.log.resync_count();
    for event in &annotated.log.events {
        match event {
            AlignEvent::SkippedTranscript { from, to } => {
                stats.push_note(format!("skipped transcript words {from}..={to}"));
            }
            AlignEvent::ResyncJump { from, to } => {
                stats.push_note(format!("resync: cursor jumped {from} -> {to}"));
            }
            AlignEvent::UnmatchedToken { position, text } => {
                stats.push_note(format!("no transcript match for '{text}' (token {position})"));
            }
        }
    }
    Ok(stats)
}

/// Export one chapter's compact word-timing file.
pub fn export_chapter(
    cfg: &SiteConfig,
    chapter: u32,
    opts: &ChapterOptions,
) -> Result<ChapterStats, SyncError> {
    let transcript = Transcript::load(&cfg.transcript_path(chapter), chapter)?;
    let file = export_word_timing(&transcript, chapter)?;

    let status = if opts.dry_run {
        ChapterStatus::WouldExport
    } else {
        std::fs::create_dir_all(&cfg.words_dir)
            .map_err(|e| SyncError::io("create words directory", e))?;
        file.save(&cfg.words_path(chapter))?;
        ChapterStatus::Exported
    };

    let mut stats = ChapterStats::new(chapter, status);
    stats.transcript_words = file.word_count;
    Ok(stats)
}

/// Cross-check one chapter's annotated page against its exported timing.
pub fn validate_chapter(
    cfg: &SiteConfig,
    chapter: u32,
    opts: &ChapterOptions,
) -> Result<ChapterStats, SyncError> {
    let page_path = cfg.read_page_path(chapter)?;
    let html = std::fs::read_to_string(&page_path)
        .map_err(|e| SyncError::io("read reading page", e))?;

    let words_path = cfg.words_path(chapter);
    if !words_path.exists() {
        return Err(SyncError::missing_input(chapter, "word timing file"));
    }
    let timing = WordTimingFile::load(&words_path)?;

    let report = validate_sync(&html, &timing.word_texts());
    let status = if report.within_tolerance(&opts.tolerance) {
        ChapterStatus::Ok
    } else {
        ChapterStatus::OutOfTolerance
    };
    let mut stats = ChapterStats::new(chapter, status);
    stats.transcript_words = timing.word_count;
    stats.record_sync_report(&report);

    // The calibration sidecar is a playback-time artifact, but a malformed
    // one would mis-seek just as surely as a bad index.
    let calibration_path = cfg.calibration_path(chapter);
    if calibration_path.exists() {
        match Calibration::load(&calibration_path) {
            Ok(calibration) => stats.push_note(format!(
                "calibration: intro {}s, {} breaks",
                calibration.intro_offset,
                calibration.breaks.len()
            )),
            Err(err) => {
                stats.status = ChapterStatus::OutOfTolerance;
                stats.push_note(format!("bad calibration sidecar: {err}"));
            }
        }
    }
    Ok(stats)
}
