//! # Cordial Gateway
//!
//! Event ingestion and dispatch for the cordial client.
//!
//! ## Overview
//!
//! Each [`Shard`] owns one persistent gateway connection and emits decoded
//! `(name, payload)` pairs on its own channel. The [`ShardManager`] drains
//! every shard on a dedicated task and hands each event to the
//! [`Dispatcher`], which routes it to the handlers registered under that
//! event name.
//!
//! ```text
//! Shard 0 ──┐
//! Shard 1 ──┼──► ShardManager (one task per shard) ──► Dispatcher ──► handlers
//! Shard N ──┘
//! ```
//!
//! ## Key Properties
//!
//! - **Exactly once**: a one-shot handler fires on exactly one dispatch, even
//!   when shards race on the same event name
//! - **Isolation**: dispatching one event name never reaches handlers of
//!   another name; a failing handler never stops its siblings
//! - **Per-shard order**: events of one shard are dispatched in arrival order;
//!   nothing is ordered across shards
//! - **Cooperative shutdown**: buffered events are drained or reported, and
//!   calls made after shutdown are ignored
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cordial_core::{names, Event, GuildCreate, ShardId};
//! use cordial_gateway::{Dispatcher, DispatcherConfig, Handler};
//!
//! let (errors_tx, _errors_rx) = tokio::sync::mpsc::unbounded_channel();
//! let dispatcher: Arc<Dispatcher<()>> = Arc::new(Dispatcher::new(DispatcherConfig::default(), errors_tx));
//!
//! dispatcher.on(names::GUILD_CREATE, Handler::payload(|ctx, evt: GuildCreate| {
//!     println!("{} joined guild {}", ctx.shard, evt.guild.id);
//!     Ok(())
//! }));
//!
//! let event = Event::new(names::GUILD_CREATE, r#"{"id":"1"}"#);
//! dispatcher.dispatch(ShardId(0), &event, &());
//! ```

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod manager;
pub mod shard;

pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherConfig, ErrorSink};
pub use error::{FailureKind, GatewayError, HandlerFailure, Result};
pub use handler::{Context, Handler, HandlerResult, ListenerId};
pub use manager::{ConnectReport, ShardManager, ShardManagerConfig, ShardSummary, ShutdownReport};
pub use shard::{memory, ConnectionState, Shard, ShardConnection};
