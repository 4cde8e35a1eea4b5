//! Error types for the notice board.

use thiserror::Error;

/// Errors that can occur in notice board operations.
#[derive(Error, Debug)]
pub enum NoticeBoardError {
    #[error("Could not load base events: {0}")]
    SourceLoad(String),

    #[error("Missing required field: {0}")]
    Validation(&'static str),

    #[error("Event '{0}' is not one of your events and cannot be deleted")]
    ImmutableRecord(String),

    #[error("Could not save events: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for NoticeBoardError {
    fn from(e: serde_json::Error) -> Self {
        NoticeBoardError::Serialization(e.to_string())
    }
}

/// Result type alias for notice board operations.
pub type NoticeBoardResult<T> = Result<T, NoticeBoardError>;
