use std::path::Path;

use serde::Deserialize;

use crate::error::SyncError;
use crate::types::TranscriptWord;

/// A pause at least this long is a likely section break for upstream
/// consumers (the break-fixing step in post-production).
pub const LIKELY_BREAK_PAUSE_SECS: f64 = 1.5;

/// Per-chapter ASR transcript file, as written by the transcription step.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcript {
    pub duration: f64,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub pauses: Vec<Pause>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub words: Vec<RecognizedWord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognizedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Inter-word gap detected by the transcription step.
#[derive(Debug, Clone, Deserialize)]
pub struct Pause {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    #[serde(default)]
    pub after_word: Option<String>,
    #[serde(default)]
    pub before_word: Option<String>,
    #[serde(default)]
    pub after_word_index: Option<usize>,
}

impl Transcript {
    pub fn load(path: &Path, chapter: u32) -> Result<Self, SyncError> {
        if !path.exists() {
            return Err(SyncError::missing_input(chapter, "transcript file"));
        }
        let data =
            std::fs::read_to_string(path).map_err(|e| SyncError::io("read transcript", e))?;
        let transcript: Transcript =
            serde_json::from_str(&data).map_err(|e| SyncError::json("parse transcript", e))?;
        transcript.validate(chapter)?;
        Ok(transcript)
    }

    /// Timestamps must be monotonically non-decreasing across the flattened
    /// word sequence; anything else is an upstream contract violation.
    pub fn validate(&self, chapter: u32) -> Result<(), SyncError> {
        let mut last_start = f64::NEG_INFINITY;
        let mut index = 0usize;
        for segment in &self.segments {
            for word in &segment.words {
                if !word.start.is_finite() || !word.end.is_finite() {
                    return Err(SyncError::malformed_transcript(
                        chapter,
                        format!("non-finite timestamp at word {index}"),
                    ));
                }
                if word.end < word.start {
                    return Err(SyncError::malformed_transcript(
                        chapter,
                        format!(
                            "word {index} ends before it starts ({} < {})",
                            word.end, word.start
                        ),
                    ));
                }
                if word.start < last_start {
                    return Err(SyncError::malformed_transcript(
                        chapter,
                        format!(
                            "non-monotonic timestamps at word {index} ({} < {})",
                            word.start, last_start
                        ),
                    ));
                }
                last_start = word.start;
                index += 1;
            }
        }
        Ok(())
    }

    /// Flatten segments into the ordered read-only word list. Whitespace is
    /// trimmed; empty recognitions are dropped. The index into this list is
    /// the word's identity for the chapter.
    pub fn words(&self) -> Vec<TranscriptWord> {
        self.segments
            .iter()
            .flat_map(|s| &s.words)
            .filter_map(|w| {
                let text = w.word.trim();
                if text.is_empty() {
                    return None;
                }
                Some(TranscriptWord {
                    start: w.start,
                    end: w.end,
                    text: text.to_string(),
                })
            })
            .collect()
    }

    /// Pauses long enough to be candidate section breaks.
    pub fn likely_section_breaks(&self) -> impl Iterator<Item = &Pause> {
        self.pauses
            .iter()
            .filter(|p| p.duration >= LIKELY_BREAK_PAUSE_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "duration": 1.5,
        "segments": [
            {"words": [
                {"word": " The ", "start": 0.0, "end": 0.4},
                {"word": "quiet", "start": 0.4, "end": 0.9},
                {"word": "harbor", "start": 0.9, "end": 1.5}
            ]}
        ],
        "pauses": [
            {"start": 0.9, "end": 2.6, "duration": 1.7,
             "after_word": "quiet", "before_word": "harbor", "after_word_index": 1}
        ]
    }"#;

    #[test]
    fn flattens_and_trims_words() {
        let t: Transcript = serde_json::from_str(SAMPLE).unwrap();
        let words = t.words();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "The");
        assert_eq!(words[2].start, 0.9);
    }

    #[test]
    fn pauses_field_is_optional() {
        let t: Transcript =
            serde_json::from_str(r#"{"duration": 0.0, "segments": []}"#).unwrap();
        assert!(t.pauses.is_empty());
        assert!(t.words().is_empty());
    }

    #[test]
    fn long_pauses_are_likely_breaks() {
        let t: Transcript = serde_json::from_str(SAMPLE).unwrap();
        let breaks: Vec<_> = t.likely_section_breaks().collect();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].after_word_index, Some(1));
    }

    #[test]
    fn rejects_non_monotonic_timestamps() {
        let bad = r#"{
            "duration": 1.0,
            "segments": [{"words": [
                {"word": "b", "start": 0.5, "end": 0.9},
                {"word": "a", "start": 0.1, "end": 0.4}
            ]}]
        }"#;
        let t: Transcript = serde_json::from_str(bad).unwrap();
        let err = t.validate(3).unwrap_err();
        assert!(matches!(err, SyncError::MalformedTranscript { chapter: 3, .. }));
    }

    #[test]
    fn rejects_inverted_word_interval() {
        let bad = r#"{
            "duration": 1.0,
            "segments": [{"words": [{"word": "a", "start": 0.5, "end": 0.2}]}]
        }"#;
        let t: Transcript = serde_json::from_str(bad).unwrap();
        assert!(t.validate(1).is_err());
    }
}
