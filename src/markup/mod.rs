pub mod annotate;
pub mod scanner;

pub use annotate::{annotate, is_annotated, unwrap_markers, AnnotatedMarkup};
pub use scanner::{Event, Scanner, Tag, TagKind};
