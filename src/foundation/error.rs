/// Convenience result type used across lcdanim.
pub type AnimResult<T> = Result<T, AnimError>;

/// Error taxonomy for encoding jobs and container parsing.
#[derive(thiserror::Error, Debug)]
pub enum AnimError {
    /// The timeline has no slots in any phase.
    #[error("timeline is empty: intro, loop and exit have no slots")]
    EmptyTimeline,

    /// A source frame or mask image could not be fetched or decoded.
    #[error("source fetch failed: {message}")]
    SourceFetchFailed {
        message: String,
        cause: Option<String>,
    },

    /// An RLE block is not a valid pair stream for the frame size.
    #[error("malformed rle stream: {0}")]
    MalformedRleStream(String),

    /// Invalid configuration, timeline or container data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Output encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimError {
    /// Build an [`AnimError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AnimError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`AnimError::MalformedRleStream`] value.
    pub fn malformed_rle(msg: impl Into<String>) -> Self {
        Self::MalformedRleStream(msg.into())
    }

    /// Fetch failure without an underlying cause.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::SourceFetchFailed {
            message: msg.into(),
            cause: None,
        }
    }

    /// Fetch failure wrapping the collaborator's error text.
    pub fn fetch_with_cause(msg: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let cause = cause.to_string();
        Self::SourceFetchFailed {
            message: format!("{}: {cause}", msg.into()),
            cause: Some(cause),
        }
    }

    /// `true` for errors that abort a job before any output is produced.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedRleStream(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
