//! Error types for the gateway module.

use cordial_core::ShardId;
use thiserror::Error;

use crate::handler::ListenerId;

/// Errors raised by shard management.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A shard's connection could not be established or torn down.
    #[error("{shard} connection error: {reason}")]
    Connection { shard: ShardId, reason: String },

    /// A shard with this index is already managed.
    #[error("duplicate shard: {0}")]
    DuplicateShard(ShardId),

    /// `run` was called while the manager was already forwarding.
    #[error("shard manager is already running")]
    AlreadyRunning,

    /// The manager has been shut down.
    #[error("shard manager has shut down")]
    ShutDown,

    /// The shard's event stream is closed.
    #[error("{0} event stream is closed")]
    StreamClosed(ShardId),
}

/// Why one handler invocation failed.
#[derive(Debug, Error)]
pub enum FailureKind {
    /// The payload did not decode into the handler's payload type.
    #[error("payload decode failed: {0}")]
    Decode(String),

    /// The handler returned an error.
    #[error("{0:#}")]
    Failed(anyhow::Error),

    /// The handler panicked.
    #[error("panicked: {0}")]
    Panicked(String),
}

/// A handler that failed during dispatch.
///
/// Failures are isolated to the one handler and delivered on the client's
/// error sink; dispatch itself carries on.
#[derive(Debug, Error)]
#[error("listener {listener} for {event} on {shard} failed: {kind}")]
pub struct HandlerFailure {
    pub event: String,
    pub shard: ShardId,
    pub listener: ListenerId,
    pub kind: FailureKind,
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
