//! Error types for the client.

use cordial_core::CoreError;
use cordial_gateway::GatewayError;
use cordial_rest::RestError;
use cordial_sync::SyncError;
use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Shard management error.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Entity synchronization error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Transport error.
    #[error("rest error: {0}")]
    Rest(#[from] RestError),

    /// Entity model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The client configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
