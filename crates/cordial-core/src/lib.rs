//! # Cordial Core
//!
//! Pure primitives for the cordial client: identifiers, gateway events and
//! the entities that can be written back through the REST surface.
//!
//! This crate contains no I/O, no networking and no runtime. It is plain data
//! plus the copy semantics every syncable entity must honor.
//!
//! ## Key Types
//!
//! - [`Snowflake`] - Opaque unique identifier used by every server-side entity
//! - [`ShardId`] - Index of one gateway connection
//! - [`Event`] - A named, raw gateway payload emitted by a shard
//! - [`Entity`] - Dynamic copy capability shared by syncable entities
//! - [`Locked`] - Always-present lock wrapper for sharing an entity across tasks
//! - [`Role`] - The guild role entity

pub mod entity;
pub mod error;
pub mod event;
pub mod role;
pub mod types;

pub use entity::{downcast_mut, downcast_ref, DeepCopy, Entity, Locked};
pub use error::{CoreError, Result};
pub use event::{names, Event, GuildCreate, GuildDelete, PartialGuild, Ready, UnavailableGuild};
pub use role::Role;
pub use types::{ShardId, Snowflake};
