//! Query-execution error types.

use thiserror::Error;

/// Result type for query execution.
pub type ExecutorResult<T> = Result<T, QueryError>;

/// Errors that can occur while an executor runs a batch of descriptors.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Failed to reach the analytics backend.
    #[error("failed to reach analytics backend: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request timed out waiting for a response.
    #[error("analytics request timed out after {0} seconds")]
    Timeout(u64),

    /// The backend rejected the credentials.
    #[error("analytics backend rejected credentials (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The backend refused the request because a quota is exhausted.
    #[error("analytics quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The backend returned an error response.
    #[error("analytics backend error: {message} (status: {status})")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Error message from the backend.
        message: String,
    },

    /// Failed to deserialize the response body.
    #[error("failed to deserialize analytics response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response does not hold one report per request.
    #[error("analytics backend returned {actual} reports for {expected} requests")]
    ResultCount { expected: usize, actual: usize },
}

impl QueryError {
    /// Create a remote error from a status and message.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Classify a failed HTTP response into a specific error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            429 => Self::QuotaExceeded(message),
            _ => Self::remote(status, message),
        }
    }

    /// Check if a later attempt could succeed.
    ///
    /// The pipeline never retries; this only feeds the logs.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) | Self::QuotaExceeded(_) => true,
            Self::Remote { status, .. } => *status >= 500,
            Self::Unauthorized { .. } | Self::Decode(_) | Self::ResultCount { .. } => false,
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}
