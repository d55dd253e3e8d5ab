pub use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Failures surfaced by the task store, editor, import adapter, and analyze client.
///
/// Every variant is terminal for the action that triggered it; nothing is retried.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON input: {0}")]
    Format(#[source] serde_json::Error),

    #[error("Failed to serialize tasks: {0}")]
    Export(#[source] serde_json::Error),

    #[error("No tasks to analyze")]
    EmptyInput,

    #[error("Analysis failed: {0}")]
    Service(#[from] ServiceError),

    #[error("No task at position {index} (list has {len})")]
    PositionOutOfRange { index: usize, len: usize },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        CoreError::Validation(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// Any non-success status; the body is never interpreted.
    #[error("Server error")]
    Status(StatusCode),

    #[error("Malformed response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Background task failed: {0}")]
    Join(String),
}
