use crate::align::{fuzzy, normalize::normalize};
use crate::types::{AlignmentResult, ManuscriptToken, Outcome, TranscriptWord};

/// Tunable alignment parameters. The defaults were chosen empirically against
/// a real narration mismatch corpus; treat them as knobs, not requirements.
#[derive(Debug, Clone)]
pub struct AlignerTuning {
    /// Maximum number of transcript words joined for a compound match.
    pub max_join: usize,
    /// How far past the cursor a single skip-ahead match may look.
    pub lookahead: usize,
    /// Consecutive misses before a resync search is attempted.
    pub resync_trigger: u32,
    /// Resync searches `cursor + resync_min .. cursor + resync_max`.
    pub resync_min: usize,
    pub resync_max: usize,
    /// Minimum transcript key length for a prefix match.
    pub min_prefix_len: usize,
}

impl Default for AlignerTuning {
    fn default() -> Self {
        Self {
            max_join: 3,
            lookahead: 5,
            resync_trigger: 3,
            resync_min: 6,
            resync_max: 20,
            min_prefix_len: 3,
        }
    }
}

/// Aligner state between tokens. `Seeking` counts consecutive misses since
/// the last successful match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignerState {
    Aligned,
    Seeking { miss_streak: u32 },
}

/// How a single token was resolved against the transcript window. Offsets
/// are relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Direct,
    Compound { join: usize },
    Lookahead { offset: usize },
    Prefix,
    Resync { offset: usize },
    Miss,
}

/// Pure transition function of the fallback chain: given the current state,
/// a normalized manuscript key, and the transcript window starting at the
/// cursor, decide the next state and the step taken. First success wins.
fn transition(
    state: AlignerState,
    key: &str,
    window: &[String],
    tuning: &AlignerTuning,
) -> (AlignerState, Step) {
    if let Some(current) = window.first() {
        if fuzzy::similar(key, current) {
            return (AlignerState::Aligned, Step::Direct);
        }

        // Recognizer over-segmentation: "treeline" heard as "tree" + "line".
        for join in 2..=tuning.max_join {
            if window.len() < join {
                break;
            }
            let joined: String = window[..join].concat();
            if key == joined || fuzzy::similar(key, &joined) {
                return (AlignerState::Aligned, Step::Compound { join });
            }
        }

        // Extraneous recognized words ahead of the cursor are noise to skip.
        for offset in 1..=tuning.lookahead {
            let Some(candidate) = window.get(offset) else {
                break;
            };
            if fuzzy::similar(key, candidate) {
                return (AlignerState::Aligned, Step::Lookahead { offset });
            }
        }

        // Truncated recognition: manuscript "water—but" vs transcript "water".
        if current.chars().count() >= tuning.min_prefix_len && key.starts_with(current.as_str()) {
            return (AlignerState::Aligned, Step::Prefix);
        }
    }

    let miss_streak = match state {
        AlignerState::Aligned => 1,
        AlignerState::Seeking { miss_streak } => miss_streak.saturating_add(1),
    };

    if miss_streak >= tuning.resync_trigger {
        for offset in tuning.resync_min..tuning.resync_max {
            let Some(candidate) = window.get(offset) else {
                break;
            };
            if fuzzy::similar(key, candidate) {
                return (AlignerState::Aligned, Step::Resync { offset });
            }
        }
    }

    (AlignerState::Seeking { miss_streak }, Step::Miss)
}

/// Diagnostic event recorded during an alignment pass. Diagnostics are
/// informational, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignEvent {
    /// Transcript words `from..=to` had no manuscript counterpart and were
    /// skipped as recognition noise.
    SkippedTranscript { from: usize, to: usize },
    /// Cursor jumped from `from` to `to` after a run of misses; the skipped
    /// range is an alignment gap worth human review.
    ResyncJump { from: usize, to: usize },
    /// Manuscript token with no transcript counterpart (a dead word).
    UnmatchedToken { position: usize, text: String },
}

/// Accumulator for diagnostics, threaded through a pass and returned with
/// its result. Each pass owns its log, so chapter batches can run in
/// parallel with no shared state.
#[derive(Debug, Clone, Default)]
pub struct AlignmentLog {
    pub events: Vec<AlignEvent>,
}

impl AlignmentLog {
    pub fn resync_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AlignEvent::ResyncJump { .. }))
            .count()
    }

    pub fn unmatched_tokens(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            AlignEvent::UnmatchedToken { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Walks manuscript tokens against a transcript with a single monotonic
/// cursor. The cursor never moves backward, so assigned indices are
/// non-decreasing across manuscript order and the whole pass stays linear.
#[derive(Debug)]
pub struct StreamAligner {
    keys: Vec<String>,
    cursor: usize,
    state: AlignerState,
    tuning: AlignerTuning,
    log: AlignmentLog,
}

impl StreamAligner {
    pub fn new(transcript: &[TranscriptWord]) -> Self {
        Self::with_tuning(transcript, AlignerTuning::default())
    }

    pub fn with_tuning(transcript: &[TranscriptWord], tuning: AlignerTuning) -> Self {
        let keys = transcript.iter().map(|w| normalize(&w.text)).collect();
        Self {
            keys,
            cursor: 0,
            state: AlignerState::Aligned,
            tuning,
            log: AlignmentLog::default(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Resolve one manuscript token. Matched outcomes advance the cursor
    /// past the consumed transcript words; misses leave it in place.
    pub fn align_token(&mut self, token: &ManuscriptToken) -> Outcome {
        let key = normalize(&token.text);
        if key.is_empty() {
            return Outcome::NonLexical;
        }

        let window = &self.keys[self.cursor.min(self.keys.len())..];
        let (next_state, step) = transition(self.state, &key, window, &self.tuning);
        self.state = next_state;

        match step {
            Step::Direct | Step::Prefix => self.consume(self.cursor, 1),
            Step::Compound { join } => self.consume(self.cursor, join),
            Step::Lookahead { offset } => {
                tracing::debug!(
                    from = self.cursor,
                    to = self.cursor + offset - 1,
                    token = token.text.as_str(),
                    "skipping extraneous transcript words"
                );
                self.log.events.push(AlignEvent::SkippedTranscript {
                    from: self.cursor,
                    to: self.cursor + offset - 1,
                });
                self.consume(self.cursor + offset, 1)
            }
            Step::Resync { offset } => {
                tracing::debug!(
                    from = self.cursor,
                    to = self.cursor + offset,
                    token = token.text.as_str(),
                    "resync jump after miss streak"
                );
                self.log.events.push(AlignEvent::ResyncJump {
                    from: self.cursor,
                    to: self.cursor + offset,
                });
                self.consume(self.cursor + offset, 1)
            }
            Step::Miss => {
                self.log.events.push(AlignEvent::UnmatchedToken {
                    position: token.position,
                    text: token.text.clone(),
                });
                Outcome::Unmatched
            }
        }
    }

    fn consume(&mut self, index: usize, consumed: usize) -> Outcome {
        self.cursor = index + consumed;
        Outcome::Matched { index, consumed }
    }

    pub fn into_log(self) -> AlignmentLog {
        self.log
    }

    /// Convenience pass over a full token stream.
    pub fn align_all(
        transcript: &[TranscriptWord],
        tokens: &[ManuscriptToken],
        tuning: AlignerTuning,
    ) -> (AlignmentResult, AlignmentLog) {
        let mut aligner = Self::with_tuning(transcript, tuning);
        let outcomes = tokens.iter().map(|t| aligner.align_token(t)).collect();
        (AlignmentResult { outcomes }, aligner.into_log())
    }
}
