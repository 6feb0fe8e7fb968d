//! # Cordial Sync
//!
//! Writing locally held entities back to the server.
//!
//! ## Overview
//!
//! A local entity is in one of three states:
//!
//! ```text
//!   Detached ──persist(None)──► Persisting ──ok──► Bound
//!                                   │
//!                                   └──err──► (unchanged)
//!   Bound ──persist(Some(changes))/remove──► Persisting ──► Bound | (unchanged)
//! ```
//!
//! A value becomes *bound* when its `copy_of` marker is set, which happens
//! after a successful create, update or fetch. The marker is the optimistic
//! concurrency token: [`is_stale_copy_of`] tells whether a fetched value
//! descends from the same server entity the caller holds.
//!
//! ## Key Properties
//!
//! - **No partial writes**: a failed call never mutates the caller's entity
//! - **Sparse updates**: only fields that differ are transmitted
//! - **No retries**: rate limiting and network errors are passed through
//!   from the transport unmodified
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cordial_core::{Role, Snowflake};
//! use cordial_rest::Requester;
//! use cordial_sync::Syncable;
//!
//! async fn example(rest: &dyn Requester) -> cordial_sync::Result<()> {
//!     let mut role = Role::builder(Snowflake::new(244200618854580224))
//!         .name("moderators")
//!         .build();
//!
//!     // Create on the server; the role is now bound to the new id.
//!     role.persist(rest, None).await?;
//!
//!     // Rename it.
//!     let mut changes = role.clone();
//!     changes.name = "mods".into();
//!     role.persist(rest, Some(&changes)).await?;
//!
//!     role.remove(rest).await
//! }
//! ```

pub mod error;
pub mod params;
pub mod role;
pub mod syncable;

pub use error::{Result, SyncError};
pub use params::{CreateRoleParams, ModifyRoleParams, RolePositionParams};
pub use role::{fetch_guild_roles, refresh_role};
pub use syncable::{is_stale_copy_of, persist, remove, Syncable};
