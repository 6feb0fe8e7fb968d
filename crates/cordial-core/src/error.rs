//! Error types for the cordial core.

use thiserror::Error;

/// Errors raised by pure entity operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An operation received an entity of the wrong kind.
    #[error("unsupported operand: expected {expected}, got {actual}")]
    UnsupportedOperand {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid snowflake: {0}")]
    InvalidSnowflake(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
