//! End-to-end scenarios over the annotate -> export -> validate pipeline,
//! driven through real files in a temporary project tree.

use std::fs;
use std::path::Path;

use wordsync::pipeline::{annotate_chapter, export_chapter, validate_chapter, ChapterOptions};
use wordsync::{
    annotate, export_word_timing, is_annotated, unwrap_markers, validate_sync, AlignerTuning,
    Break, Calibration, ChapterStatus, Outcome, SiteConfig, Transcript, TranscriptWord,
    WordTimingFile,
};

fn words(entries: &[(f64, f64, &str)]) -> Vec<TranscriptWord> {
    entries
        .iter()
        .map(|(start, end, text)| TranscriptWord {
            start: *start,
            end: *end,
            text: (*text).to_string(),
        })
        .collect()
}

fn page(body: &str) -> String {
    format!(
        r#"<html><body><div class="content"><p>{body}</p></div></body></html>"#
    )
}

#[test]
fn scenario_a_clean_alignment() {
    let transcript = words(&[(0.0, 0.4, "The"), (0.4, 0.9, "quiet"), (0.9, 1.5, "harbor")]);
    let out = annotate(&page("The quiet harbor."), &transcript, AlignerTuning::default());

    let indices: Vec<usize> = out.result.outcomes.iter().filter_map(|o| o.index()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(out.wrapped, 3);

    let texts: Vec<&str> = transcript.iter().map(|w| w.text.as_str()).collect();
    let report = validate_sync(&out.html, &texts);
    assert!(report.mismatches.is_empty());
    assert!(report.dead_words.is_empty());
}

#[test]
fn scenario_b_compound_word() {
    let transcript = words(&[(0.0, 0.3, "tree"), (0.3, 0.6, "line"), (0.6, 1.0, "faded")]);
    let out = annotate(&page("treeline faded."), &transcript, AlignerTuning::default());

    assert_eq!(
        out.result.outcomes[0],
        Outcome::Matched {
            index: 0,
            consumed: 2
        }
    );
    assert_eq!(
        out.result.outcomes[1],
        Outcome::Matched {
            index: 2,
            consumed: 1
        }
    );
}

#[test]
fn scenario_c_dead_word() {
    let transcript = words(&[(0.0, 0.3, "Sarah"), (0.3, 0.6, "left")]);
    let out = annotate(&page("Sarah quickly left."), &transcript, AlignerTuning::default());

    assert!(out.html.contains(r#"<span class="w">quickly</span>"#));

    let texts: Vec<&str> = transcript.iter().map(|w| w.text.as_str()).collect();
    let report = validate_sync(&out.html, &texts);
    assert_eq!(report.dead_words, vec!["quickly".to_string()]);
    assert!(report.mismatches.is_empty());
}

#[test]
fn scenario_d_calibration() {
    let calibration = Calibration {
        intro_offset: 24.0,
        breaks: vec![Break {
            raw_position: 180.0,
            duration: 30.0,
        }],
    };
    assert_eq!(calibration.to_final(100.0), 124.0);
    assert_eq!(calibration.to_final(200.0), 254.0);
    assert_eq!(calibration.to_final(0.0), 24.0);
}

#[test]
fn alignment_indices_are_monotonic_under_noise() {
    // Fabricated unmatched run of 5 manuscript tokens, then a correct
    // continuation. The aligner must recover and never assign an index
    // below its last success.
    let transcript = words(&[
        (0.0, 0.1, "first"),
        (0.1, 0.2, "second"),
        (0.2, 0.3, "third"),
        (0.3, 0.4, "alpha1"),
        (0.4, 0.5, "alpha2"),
        (0.5, 0.6, "alpha3"),
        (0.6, 0.7, "alpha4"),
        (0.7, 0.8, "alpha5"),
        (0.8, 0.9, "alpha6"),
        (0.9, 1.0, "fourth"),
        (1.0, 1.1, "fifth"),
    ]);
    let body = "first second third zonk1 zonk2 zonk3 zonk4 zonk5 fourth fifth";
    let out = annotate(&page(body), &transcript, AlignerTuning::default());

    let indices: Vec<usize> = out.result.outcomes.iter().filter_map(|o| o.index()).collect();
    for pair in indices.windows(2) {
        assert!(pair[1] >= pair[0], "indices regressed: {indices:?}");
    }
    // The continuation realigns exactly.
    assert!(indices.ends_with(&[9, 10]), "no recovery: {indices:?}");
}

#[test]
fn annotate_is_idempotent_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = project(dir.path());
    write_transcript(
        &cfg,
        1,
        r#"{"duration": 1.5, "segments": [{"words": [
            {"word": "The", "start": 0.0, "end": 0.4},
            {"word": "quiet", "start": 0.4, "end": 0.9},
            {"word": "harbor", "start": 0.9, "end": 1.5}
        ]}]}"#,
    );
    let page_path = cfg.read_dir.join("chapter-01-the-quiet-harbor.html");
    fs::write(&page_path, page("The quiet harbor.")).unwrap();

    let opts = ChapterOptions::default();
    let first = annotate_chapter(&cfg, 1, &opts).unwrap();
    assert_eq!(first.status, ChapterStatus::Annotated);
    assert_eq!(first.wrapped, 3);
    let annotated_html = fs::read_to_string(&page_path).unwrap();
    assert!(is_annotated(&annotated_html));

    // Second pass without force leaves the file untouched.
    let second = annotate_chapter(&cfg, 1, &opts).unwrap();
    assert_eq!(second.status, ChapterStatus::AlreadyAnnotated);
    assert_eq!(fs::read_to_string(&page_path).unwrap(), annotated_html);

    // Force unwraps and re-annotates to the identical result.
    let forced_opts = ChapterOptions {
        force: true,
        ..ChapterOptions::default()
    };
    let forced = annotate_chapter(&cfg, 1, &forced_opts).unwrap();
    assert_eq!(forced.status, ChapterStatus::Annotated);
    assert_eq!(fs::read_to_string(&page_path).unwrap(), annotated_html);
}

#[test]
fn dry_run_leaves_the_page_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = project(dir.path());
    write_transcript(
        &cfg,
        2,
        r#"{"duration": 0.5, "segments": [{"words": [
            {"word": "tide", "start": 0.0, "end": 0.5}
        ]}]}"#,
    );
    let page_path = cfg.read_dir.join("chapter-02.html");
    let original = page("tide");
    fs::write(&page_path, &original).unwrap();

    let opts = ChapterOptions {
        dry_run: true,
        ..ChapterOptions::default()
    };
    let stats = annotate_chapter(&cfg, 2, &opts).unwrap();
    assert_eq!(stats.status, ChapterStatus::WouldAnnotate);
    assert_eq!(stats.wrapped, 1);
    assert_eq!(fs::read_to_string(&page_path).unwrap(), original);
}

#[test]
fn export_then_validate_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = project(dir.path());
    write_transcript(
        &cfg,
        3,
        r#"{"duration": 1.5, "segments": [{"words": [
            {"word": "The", "start": 0.0, "end": 0.4},
            {"word": "quiet", "start": 0.4, "end": 0.9},
            {"word": "harbor", "start": 0.9, "end": 1.5}
        ]}]}"#,
    );
    let page_path = cfg.read_dir.join("chapter-03.html");
    fs::write(&page_path, page("The quiet harbor.")).unwrap();

    let opts = ChapterOptions::default();
    annotate_chapter(&cfg, 3, &opts).unwrap();
    let exported = export_chapter(&cfg, 3, &opts).unwrap();
    assert_eq!(exported.status, ChapterStatus::Exported);
    assert_eq!(exported.transcript_words, 3);

    let validated = validate_chapter(&cfg, 3, &opts).unwrap();
    assert_eq!(validated.status, ChapterStatus::Ok);
    assert_eq!(validated.mismatches, 0);
    assert_eq!(validated.dead_words, 0);
}

#[test]
fn stale_annotation_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = project(dir.path());
    fs::create_dir_all(&cfg.words_dir).unwrap();

    // Timing exported from a newer narration than the annotated page.
    let timing = WordTimingFile {
        chapter: 4,
        raw_duration: 1.0,
        word_count: 2,
        words: vec![
            (0.0, 0.5, "completely".to_string()),
            (0.5, 1.0, "different".to_string()),
        ],
        calibration: None,
    };
    timing.save(&cfg.words_path(4)).unwrap();

    let stale = r#"<div class="content"><span class="w" data-i="0">harbor</span> <span class="w" data-i="1">quay</span></div>"#;
    fs::write(cfg.read_dir.join("chapter-04.html"), stale).unwrap();

    let opts = ChapterOptions::default();
    let stats = validate_chapter(&cfg, 4, &opts).unwrap();
    assert_eq!(stats.status, ChapterStatus::OutOfTolerance);
    assert_eq!(stats.mismatches, 2);
}

#[test]
fn missing_transcript_is_an_isolated_per_chapter_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = project(dir.path());
    fs::write(cfg.read_dir.join("chapter-09.html"), page("tide")).unwrap();

    let err = annotate_chapter(&cfg, 9, &ChapterOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        wordsync::SyncError::MissingInput { chapter: 9, .. }
    ));
}

#[test]
fn unwrap_restores_the_original_page() {
    let transcript = words(&[(0.0, 0.4, "The"), (0.4, 0.9, "quiet"), (0.9, 1.5, "harbor")]);
    let original = page("The quiet harbor.");
    let out = annotate(&original, &transcript, AlignerTuning::default());
    assert_ne!(out.html, original);
    assert_eq!(unwrap_markers(&out.html), original);
}

#[test]
fn export_rejects_malformed_transcript() {
    let bad: Transcript = serde_json::from_str(
        r#"{"duration": 1.0, "segments": [{"words": [
            {"word": "late", "start": 0.9, "end": 1.0},
            {"word": "early", "start": 0.1, "end": 0.2}
        ]}]}"#,
    )
    .unwrap();
    assert!(export_word_timing(&bad, 7).is_err());
}

fn project(root: &Path) -> SiteConfig {
    let cfg = SiteConfig::new(root);
    fs::create_dir_all(&cfg.transcript_dir).unwrap();
    fs::create_dir_all(&cfg.read_dir).unwrap();
    fs::create_dir_all(&cfg.words_dir).unwrap();
    cfg
}

fn write_transcript(cfg: &SiteConfig, chapter: u32, json: &str) {
    fs::write(
        cfg.transcript_dir
            .join(format!("chapter-{chapter:02}-transcript.json")),
        json,
    )
    .unwrap();
}
