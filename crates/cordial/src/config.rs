//! Client configuration.

use std::fmt;

use cordial_gateway::{DispatcherConfig, ShardManagerConfig};

use crate::error::{ClientError, Result};

/// Configuration for the [`Client`](crate::Client).
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Bot token used to authenticate shards and REST calls.
    pub bot_token: String,
    /// Dispatcher configuration.
    pub dispatcher: DispatcherConfig,
    /// Shard manager configuration.
    pub shards: ShardManagerConfig,
}

impl ClientConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(ClientError::InvalidConfig("bot token is empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("bot_token", &"<redacted>")
            .field("dispatcher", &self.dispatcher)
            .field("shards", &self.shards)
            .finish()
    }
}
