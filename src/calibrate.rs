use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// One silence inserted by post-production. `raw_position` is seconds into
/// the unmodified narration (the same time frame as transcript timestamps);
/// `duration` is the seconds of silence inserted there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Break {
    pub raw_position: f64,
    pub duration: f64,
}

/// Maps raw-narration timestamps to final-mix timestamps. Persisted as a
/// small per-chapter sidecar so silence edits to the mix only touch this
/// file, never the exported word timing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default)]
    pub intro_offset: f64,
    #[serde(default)]
    pub breaks: Vec<Break>,
}

impl Calibration {
    /// Final-mix timestamp for a raw-narration timestamp: the intro offset
    /// plus every inserted silence at or before `raw_ts`. Non-decreasing in
    /// `raw_ts` as long as `validate()` holds.
    pub fn to_final(&self, raw_ts: f64) -> f64 {
        let inserted: f64 = self
            .breaks
            .iter()
            .filter(|b| b.raw_position <= raw_ts)
            .map(|b| b.duration)
            .sum();
        raw_ts + self.intro_offset + inserted
    }

    /// Breaks must be sorted ascending, non-overlapping in position, with
    /// non-negative durations; the intro offset must be non-negative.
    pub fn validate(&self) -> Result<(), SyncError> {
        if !(self.intro_offset >= 0.0) {
            return Err(SyncError::invalid_input(format!(
                "negative or non-finite intro_offset: {}",
                self.intro_offset
            )));
        }
        let mut last = f64::NEG_INFINITY;
        for (i, b) in self.breaks.iter().enumerate() {
            if !(b.duration >= 0.0) {
                return Err(SyncError::invalid_input(format!(
                    "break {i} has negative or non-finite duration: {}",
                    b.duration
                )));
            }
            if b.raw_position <= last {
                return Err(SyncError::invalid_input(format!(
                    "break {i} not in ascending position order: {} after {}",
                    b.raw_position, last
                )));
            }
            last = b.raw_position;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SyncError::io("read calibration", e))?;
        let calibration: Calibration =
            serde_json::from_str(&data).map_err(|e| SyncError::json("parse calibration", e))?;
        calibration.validate()?;
        Ok(calibration)
    }

    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| SyncError::json("serialize calibration", e))?;
        std::fs::write(path, data).map_err(|e| SyncError::io("write calibration", e))
    }
}
