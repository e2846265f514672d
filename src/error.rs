use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("chapter {chapter}: missing {what}")]
    MissingInput { chapter: u32, what: &'static str },
    #[error("chapter {chapter}: malformed transcript: {message}")]
    MalformedTranscript { chapter: u32, message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl SyncError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn missing_input(chapter: u32, what: &'static str) -> Self {
        Self::MissingInput { chapter, what }
    }

    pub(crate) fn malformed_transcript(chapter: u32, message: impl Into<String>) -> Self {
        Self::MalformedTranscript {
            chapter,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
