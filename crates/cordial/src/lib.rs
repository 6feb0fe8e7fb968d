//! # Cordial
//!
//! A client for a sharded real-time chat gateway paired with a rate-limited
//! REST surface.
//!
//! ## Overview
//!
//! - **Dispatch**: events from every shard are routed by name to recurring
//!   and one-shot handlers
//! - **Shards**: each connection is drained by its own task, preserving
//!   per-shard order
//! - **Guild tracking**: the client keeps the set of connected guilds
//!   current from lifecycle events
//! - **Sync**: entities are created, updated and deleted through the REST
//!   transport, with copy markers to detect stale local values
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cordial::{Client, ClientConfig, Handler};
//! use cordial::core::{names, GuildCreate};
//! use cordial::rest::MemoryRequester;
//!
//! async fn example() -> cordial::Result<()> {
//!     let client = Client::new(ClientConfig::new("token"), Arc::new(MemoryRequester::new()))?;
//!
//!     client.on(names::GUILD_CREATE, Handler::payload(|ctx, evt: GuildCreate| {
//!         tracing::info!("{} joined {}", ctx.shard, evt.guild.id);
//!         Ok(())
//!     }));
//!
//!     // client.add_shard(shard).await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `cordial::core` - Identifiers, events and entities
//! - `cordial::rest` - Transport contract
//! - `cordial::sync` - Entity synchronization
//! - `cordial::gateway` - Dispatcher and shard manager

pub mod cache;
pub mod client;
pub mod config;
pub mod error;

// Re-export component crates
pub use cordial_core as core;
pub use cordial_gateway as gateway;
pub use cordial_rest as rest;
pub use cordial_sync as sync;

// Re-export main types for convenience
pub use cache::ConnectedGuilds;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, Result};

// Re-export commonly used component types
pub use cordial_core::{Event, Role, ShardId, Snowflake};
pub use cordial_gateway::{Context, Handler, HandlerFailure, HandlerResult, ListenerId};
pub use cordial_sync::{is_stale_copy_of, Syncable};
