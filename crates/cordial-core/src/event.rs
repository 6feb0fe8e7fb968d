//! Gateway events and the typed payloads the client itself consumes.
//!
//! A shard emits each event as a name plus the undecoded `d` field of the
//! gateway frame. Decoding happens at the handler that asks for a typed
//! payload, so events nobody listens to are never parsed.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::Snowflake;

/// Gateway event names.
pub mod names {
    pub const READY: &str = "READY";
    pub const RESUMED: &str = "RESUMED";
    pub const GUILD_CREATE: &str = "GUILD_CREATE";
    pub const GUILD_UPDATE: &str = "GUILD_UPDATE";
    pub const GUILD_DELETE: &str = "GUILD_DELETE";
    pub const GUILD_ROLE_CREATE: &str = "GUILD_ROLE_CREATE";
    pub const GUILD_ROLE_UPDATE: &str = "GUILD_ROLE_UPDATE";
    pub const GUILD_ROLE_DELETE: &str = "GUILD_ROLE_DELETE";
    pub const MESSAGE_CREATE: &str = "MESSAGE_CREATE";
}

/// A named gateway event with its raw payload.
///
/// Immutable once emitted; cloning shares the payload buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub payload: Bytes,
}

impl Event {
    /// Create an event.
    pub fn new(name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Create an event carrying no payload.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Bytes::new())
    }

    /// Create an event whose payload is `value` encoded as JSON.
    pub fn json<T: Serialize>(name: impl Into<String>, value: &T) -> serde_json::Result<Self> {
        Ok(Self::new(name, serde_json::to_vec(value)?))
    }
}

/// The guild fields the client tracks for connected guilds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unavailable: bool,
}

impl PartialGuild {
    /// A guild known only by id.
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// A guild that is offline or that the client was removed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

/// Payload of `GUILD_CREATE`: the guild became available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildCreate {
    pub guild: PartialGuild,
}

/// Payload of `GUILD_DELETE`: the guild became unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildDelete {
    pub unavailable_guild: UnavailableGuild,
}

/// Payload of `READY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ready {
    #[serde(rename = "v", default)]
    pub version: u8,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,
}
