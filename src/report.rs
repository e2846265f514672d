use serde::Serialize;

use crate::validate::SyncReport;

/// At most this many diagnostic notes are kept per chapter; the full lists
/// are only useful interactively, not in a batch summary.
pub const NOTE_SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    Annotated,
    WouldAnnotate,
    AlreadyAnnotated,
    Exported,
    WouldExport,
    Ok,
    OutOfTolerance,
    Failed,
}

/// Outcome of one chapter pass, whichever operation ran.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterStats {
    pub chapter: u32,
    pub status: ChapterStatus,
    pub transcript_words: usize,
    pub wrapped: usize,
    pub unmatched: usize,
    pub mismatches: usize,
    pub dead_words: usize,
    pub resyncs: usize,
    /// Bounded sample of human-readable diagnostics.
    pub notes: Vec<String>,
}

impl ChapterStats {
    pub fn new(chapter: u32, status: ChapterStatus) -> Self {
        Self {
            chapter,
            status,
            transcript_words: 0,
            wrapped: 0,
            unmatched: 0,
            mismatches: 0,
            dead_words: 0,
            resyncs: 0,
            notes: Vec::new(),
        }
    }

    pub fn failed(chapter: u32, message: String) -> Self {
        let mut stats = Self::new(chapter, ChapterStatus::Failed);
        stats.notes.push(message);
        stats
    }

    pub fn push_note(&mut self, note: String) {
        if self.notes.len() < NOTE_SAMPLE_LIMIT {
            self.notes.push(note);
        }
    }

    pub fn record_sync_report(&mut self, report: &SyncReport) {
        self.mismatches = report.mismatches.len();
        self.dead_words = report.dead_words.len();
        for mm in report.mismatches.iter().take(5) {
            self.push_note(format!(
                "mismatch at [{}]: markup '{}' vs transcript '{}' ({:.2})",
                mm.transcript_index, mm.markup_word, mm.transcript_word, mm.similarity
            ));
        }
        for dead in report.dead_words.iter().take(5) {
            self.push_note(format!("dead word: '{dead}'"));
        }
    }
}

/// End-of-run summary over a chapter batch. Diagnostics accumulate here
/// instead of interleaving per-item logging.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub chapters: Vec<ChapterStats>,
    pub total_wrapped: usize,
    pub total_mismatches: usize,
    pub total_dead_words: usize,
    pub failed_chapters: usize,
}

impl RunSummary {
    pub fn from_chapters(chapters: Vec<ChapterStats>) -> Self {
        let total_wrapped = chapters.iter().map(|c| c.wrapped).sum();
        let total_mismatches = chapters.iter().map(|c| c.mismatches).sum();
        let total_dead_words = chapters.iter().map(|c| c.dead_words).sum();
        let failed_chapters = chapters
            .iter()
            .filter(|c| c.status == ChapterStatus::Failed)
            .count();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            chapters,
            total_wrapped,
            total_mismatches,
            total_dead_words,
            failed_chapters,
        }
    }

    /// Validation beyond tolerance is the only condition that fails a run;
    /// per-chapter input problems are reported but never block the batch.
    pub fn out_of_tolerance(&self) -> bool {
        self.chapters
            .iter()
            .any(|c| c.status == ChapterStatus::OutOfTolerance)
    }
}
