use std::sync::OnceLock;

use regex::Regex;

use crate::align::fuzzy;
use crate::align::normalize::normalize;

/// Indexed words whose overlap ratio with their transcript counterpart
/// falls below this are reported as mismatches.
const MISMATCH_THRESHOLD: f64 = 0.6;

/// Per-chapter tolerance for the regression gate. A published page that
/// exceeds either bound would mis-seek for readers.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    pub max_mismatches: usize,
    pub max_dead_words: usize,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            max_mismatches: 0,
            max_dead_words: 10,
        }
    }
}

/// An indexed markup word that no longer resembles the transcript word at
/// its index.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub transcript_index: usize,
    pub markup_word: String,
    pub transcript_word: String,
    pub similarity: f64,
}

/// Cross-check of annotated markup against exported word timing.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub indexed_count: usize,
    pub mismatches: Vec<Mismatch>,
    /// Content words wrapped without an index (not clickable).
    pub dead_words: Vec<String>,
}

impl SyncReport {
    pub fn within_tolerance(&self, tolerance: &Tolerance) -> bool {
        self.mismatches.len() <= tolerance.max_mismatches
            && self.dead_words.len() <= tolerance.max_dead_words
    }
}

/// Word markers extracted from annotated markup, in document order.
pub fn extract_markers(html: &str) -> Vec<(String, Option<usize>)> {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    let marker = MARKER.get_or_init(|| {
        Regex::new(r#"<span class="w"(?: data-i="(\d+)")?>([^<]+)</span>"#)
            .expect("marker regex is valid")
    });
    marker
        .captures_iter(html)
        .map(|c| {
            let index = c.get(1).and_then(|m| m.as_str().parse().ok());
            (c[2].to_string(), index)
        })
        .collect()
}

/// Recompute similarity between each indexed markup word and its transcript
/// counterpart, and collect un-indexed content words as dead words.
pub fn validate_sync(html: &str, transcript_words: &[&str]) -> SyncReport {
    let mut report = SyncReport::default();

    for (markup_word, index) in extract_markers(html) {
        let markup_norm = normalize(&markup_word);
        let Some(index) = index else {
            // Punctuation-only tokens are wrapped but are not words.
            if !markup_norm.is_empty() {
                report.dead_words.push(markup_word);
            }
            continue;
        };
        report.indexed_count += 1;

        let Some(transcript_word) = transcript_words.get(index) else {
            report.mismatches.push(Mismatch {
                transcript_index: index,
                markup_word,
                transcript_word: String::new(),
                similarity: 0.0,
            });
            continue;
        };

        let transcript_norm = normalize(transcript_word);
        if markup_norm == transcript_norm {
            continue;
        }
        // A compound manuscript word points at its first transcript piece;
        // prefix containment is fine.
        if markup_norm.starts_with(transcript_norm.as_str()) && !transcript_norm.is_empty() {
            continue;
        }
        let similarity = fuzzy::overlap_ratio(&markup_norm, &transcript_norm);
        if similarity < MISMATCH_THRESHOLD {
            report.mismatches.push(Mismatch {
                transcript_index: index,
                markup_word,
                transcript_word: (*transcript_word).to_string(),
                similarity,
            });
        }
    }

    report
}
