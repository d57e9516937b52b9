//! Delivery error types.

use thiserror::Error;

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Errors that can occur while handing a segment to a sink.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Failed to reach the chat service.
    #[error("failed to reach chat service: {0}")]
    Transport(#[source] reqwest::Error),

    /// The chat service rejected the message.
    #[error("chat service rejected message: {message} (status: {status})")]
    Rejected { status: u16, message: String },

    /// The segment exceeds the sink's message limit.
    #[error("segment of {length} characters exceeds message limit of {limit}")]
    SegmentTooLong { length: usize, limit: usize },

    /// Writing to a local stream failed.
    #[error("failed to write message: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliveryError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}
