pub mod fuzzy;
pub mod normalize;
pub mod stream;

pub use normalize::normalize;
pub use stream::{AlignEvent, AlignerState, AlignerTuning, AlignmentLog, StreamAligner};
