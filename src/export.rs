use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibrate::Calibration;
use crate::error::SyncError;
use crate::transcript::Transcript;
use crate::types::TranscriptWord;

/// Compact per-chapter word-timing file consumed by the reading page at
/// runtime. `words` is a triple array `[[start, end, "word"], ...]` to keep
/// the client payload small; the array index is the word's identity and
/// matches the `data-i` attribute in annotated markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordTimingFile {
    pub chapter: u32,
    /// Duration of the raw narration in seconds. Older files named this
    /// field `duration`.
    #[serde(alias = "duration")]
    pub raw_duration: f64,
    pub word_count: usize,
    pub words: Vec<(f64, f64, String)>,
    /// An older variant embedded calibration here. Still readable, no
    /// longer written; calibration lives in its own sidecar now.
    #[serde(default, skip_serializing)]
    pub calibration: Option<Calibration>,
}

impl WordTimingFile {
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SyncError::io("read word timing", e))?;
        serde_json::from_str(&data).map_err(|e| SyncError::json("parse word timing", e))
    }

    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        let data = serde_json::to_string(self)
            .map_err(|e| SyncError::json("serialize word timing", e))?;
        std::fs::write(path, data).map_err(|e| SyncError::io("write word timing", e))
    }

    pub fn word_texts(&self) -> Vec<&str> {
        self.words.iter().map(|(_, _, w)| w.as_str()).collect()
    }

    pub fn to_transcript_words(&self) -> Vec<TranscriptWord> {
        self.words
            .iter()
            .map(|(start, end, text)| TranscriptWord {
                start: *start,
                end: *end,
                text: text.clone(),
            })
            .collect()
    }
}

/// Pure extraction of the compact timing list from a transcript. No
/// alignment, no calibration; timestamps stay in raw-narration time.
pub fn export_word_timing(
    transcript: &Transcript,
    chapter: u32,
) -> Result<WordTimingFile, SyncError> {
    transcript.validate(chapter)?;
    let words: Vec<(f64, f64, String)> = transcript
        .words()
        .into_iter()
        .map(|w| (round_ms(w.start), round_ms(w.end), w.text))
        .collect();
    Ok(WordTimingFile {
        chapter,
        raw_duration: transcript.duration,
        word_count: words.len(),
        words,
        calibration: None,
    })
}

/// Millisecond precision is plenty for seek targets and keeps the JSON small.
fn round_ms(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Transcript {
        serde_json::from_str(
            r#"{
                "duration": 1.5,
                "segments": [{"words": [
                    {"word": "The", "start": 0.0, "end": 0.4},
                    {"word": "quiet", "start": 0.4004, "end": 0.9},
                    {"word": "harbor", "start": 0.9, "end": 1.5}
                ]}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn exports_compact_triples() {
        let file = export_word_timing(&transcript(), 1).unwrap();
        assert_eq!(file.chapter, 1);
        assert_eq!(file.word_count, 3);
        assert_eq!(file.words[1], (0.4, 0.9, "quiet".to_string()));

        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains(r#"[0.0,0.4,"The"]"#) || json.contains(r#"[0,0.4,"The"]"#));
        assert!(!json.contains("calibration"));
    }

    #[test]
    fn rejects_non_monotonic_input() {
        let bad: Transcript = serde_json::from_str(
            r#"{
                "duration": 1.0,
                "segments": [{"words": [
                    {"word": "b", "start": 0.9, "end": 1.0},
                    {"word": "a", "start": 0.1, "end": 0.2}
                ]}]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            export_word_timing(&bad, 2),
            Err(SyncError::MalformedTranscript { chapter: 2, .. })
        ));
    }

    #[test]
    fn reads_legacy_embedded_calibration() {
        let legacy = r#"{
            "chapter": 4,
            "duration": 300.0,
            "word_count": 1,
            "words": [[0.0, 0.5, "tide"]],
            "calibration": {"intro_offset": 24.0, "breaks": []}
        }"#;
        let file: WordTimingFile = serde_json::from_str(legacy).unwrap();
        assert_eq!(file.raw_duration, 300.0);
        let cal = file.calibration.as_ref().unwrap();
        assert_eq!(cal.intro_offset, 24.0);
        // Round-tripping drops the embedded block; only the sidecar carries
        // calibration now.
        let rewritten = serde_json::to_string(&file).unwrap();
        assert!(!rewritten.contains("calibration"));
    }
}
