/// One recognized word from the ASR transcript. The index of a word within
/// its chapter's flattened word list is its identity; the list is read-only
/// ground truth and never mutated here.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptWord {
    /// Seconds into the raw (unmixed) narration, start inclusive.
    pub start: f64,
    /// Seconds into the raw narration, end exclusive.
    pub end: f64,
    pub text: String,
}

/// One word extracted from manuscript markup, to be synchronized.
#[derive(Debug, Clone, PartialEq)]
pub struct ManuscriptToken {
    pub text: String,
    /// Zero-based position within the extracted token stream.
    pub position: usize,
}

/// Per-token alignment decision produced by the stream aligner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Token aligned to `transcript[index]`. `consumed` is the number of
    /// transcript words absorbed; > 1 when one manuscript token spans
    /// several recognized words ("treeline" <- "tree" + "line").
    Matched { index: usize, consumed: usize },
    /// No transcript counterpart; the token is wrapped without an index.
    Unmatched,
    /// Token normalizes to nothing (pure punctuation); not a miss.
    NonLexical,
}

impl Outcome {
    pub fn index(&self) -> Option<usize> {
        match *self {
            Outcome::Matched { index, .. } => Some(index),
            Outcome::Unmatched | Outcome::NonLexical => None,
        }
    }
}

/// Full result of one alignment pass: one outcome per manuscript token, in
/// manuscript order. Transient, scoped to one pass.
#[derive(Debug, Clone, Default)]
pub struct AlignmentResult {
    pub outcomes: Vec<Outcome>,
}

impl AlignmentResult {
    pub fn matched_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Matched { .. }))
            .count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Unmatched))
            .count()
    }
}
