pub mod align;
pub mod calibrate;
pub mod config;
pub mod error;
pub mod export;
pub mod markup;
pub mod pipeline;
pub mod report;
pub mod transcript;
pub mod types;
pub mod validate;

pub use align::{AlignerTuning, AlignmentLog, StreamAligner};
pub use calibrate::{Break, Calibration};
pub use config::SiteConfig;
pub use error::SyncError;
pub use export::{export_word_timing, WordTimingFile};
pub use markup::{annotate, is_annotated, unwrap_markers, AnnotatedMarkup};
pub use report::{ChapterStats, ChapterStatus, RunSummary};
pub use transcript::Transcript;
pub use types::{AlignmentResult, ManuscriptToken, Outcome, TranscriptWord};
pub use validate::{validate_sync, SyncReport, Tolerance};
