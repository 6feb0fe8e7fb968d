//! Error types for entity synchronization.

use cordial_core::CoreError;
use cordial_rest::{RestError, StatusCode};
use thiserror::Error;

/// Errors that can occur while writing an entity back to the server.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An id needed to address the endpoint is empty.
    #[error("missing identifier: {0}")]
    MissingIdentifier(&'static str),

    /// The operand is a different entity kind than the receiver.
    #[error("unsupported operand: expected {expected}, got {actual}")]
    UnsupportedOperand {
        expected: &'static str,
        actual: &'static str,
    },

    /// The call succeeded at the HTTP level but the response breaks the
    /// endpoint's contract.
    #[error("protocol violation during {operation}: {reason}")]
    ProtocolViolation {
        operation: &'static str,
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Transport-level failure, passed through unmodified.
    #[error("transport error: {0}")]
    Transport(#[from] RestError),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<CoreError> for SyncError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnsupportedOperand { expected, actual } => {
                SyncError::UnsupportedOperand { expected, actual }
            }
            CoreError::InvalidSnowflake(raw) => SyncError::InvalidIdentifier(raw),
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
