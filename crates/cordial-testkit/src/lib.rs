//! # Cordial Testkit
//!
//! Testing utilities for cordial.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a client wired to a scripted REST transport and in-memory
//!   shards, plus builders for the gateway events the client tracks
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust
//! use cordial_testkit::fixtures::{guild_create, TestFixture};
//! use cordial_core::{ShardId, Snowflake};
//!
//! let fixture = TestFixture::new();
//! fixture.client.dispatch(ShardId(0), &guild_create(Snowflake::new(1)));
//! assert_eq!(fixture.client.connected_guilds(), vec![Snowflake::new(1)]);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cordial_testkit::generators::{lifecycle_ops, connected_after};
//!
//! proptest! {
//!     #[test]
//!     fn cache_matches_model(ops in lifecycle_ops(64)) {
//!         let fixture = TestFixture::new();
//!         fixture.replay(&ops);
//!         prop_assert_eq!(fixture.client.connected_guilds(), connected_after(&ops));
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::TestFixture;
pub use generators::LifecycleOp;
