//! Error types for queue operations

use thiserror::Error;

/// Result type for queue operations
pub type MqResult<T> = Result<T, MqError>;

/// Coarse classification of an [`MqError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed arguments: bad payload shapes, empty queue names
    ValidationError,
    /// The message is not held by the queue any more
    MessageNotFound,
    /// A queue was built without a Tokio runtime to drive its timers
    RuntimeMissing,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::MessageNotFound => "MessageNotFound",
            Self::RuntimeMissing => "RuntimeMissing",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MqError {
    #[error("Must provide a valid queue name, it cannot be empty")]
    InvalidQueueName,

    #[error("Invalid Type: expected a string, an object or an array, got {0}")]
    InvalidType(&'static str),

    #[error("Invalid message type at positions {rejected:?} ({accepted} messages accepted)")]
    InvalidMessages { accepted: usize, rejected: Vec<usize> },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "The message {id} is not in the queue. It's likely that your job took longer than {release_timeout_ms}ms to run"
    )]
    MessageNotFound { id: String, release_timeout_ms: u64 },

    #[error("Queues must be created inside a Tokio runtime")]
    NoRuntime,
}

impl MqError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidQueueName
            | Self::InvalidType(_)
            | Self::InvalidMessages { .. }
            | Self::InvalidArgument(_) => ErrorCode::ValidationError,
            Self::MessageNotFound { .. } => ErrorCode::MessageNotFound,
            Self::NoRuntime => ErrorCode::RuntimeMissing,
        }
    }

    /// Whether a caller can reasonably carry on after this error.
    ///
    /// A missing message usually means the work was already handled by
    /// another consumer after the lease expired.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.code(), ErrorCode::MessageNotFound)
    }
}
