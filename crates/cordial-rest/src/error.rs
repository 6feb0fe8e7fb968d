//! Error types for the REST transport.

use std::time::Duration;

use thiserror::Error;

use crate::request::BucketKey;

/// Errors surfaced by a [`Requester`](crate::Requester).
///
/// HTTP responses of any status are not errors; they come back as a
/// [`Response`](crate::Response) for the caller to classify.
#[derive(Debug, Error)]
pub enum RestError {
    /// The bucket (or the global limit) is exhausted.
    #[error("rate limited on bucket {bucket} (global={global}), retry after {retry_after:?}")]
    RateLimited {
        bucket: BucketKey,
        retry_after: Duration,
        global: bool,
    },

    /// Network-level failure; no response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request body encoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, RestError>;
