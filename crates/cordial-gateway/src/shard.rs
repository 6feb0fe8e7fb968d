//! Shard abstraction.
//!
//! A shard pairs one gateway connection with the channel its decoded events
//! arrive on. Wire framing, heartbeats and resume logic live behind
//! [`ShardConnection`]; the manager only connects, drains and disconnects.

use async_trait::async_trait;
use cordial_core::{Event, ShardId};
use tokio::sync::mpsc;

use crate::error::Result;

/// Lifecycle of a shard's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected, or connection was torn down.
    Disconnected,
    /// Connected and receiving events.
    Connected,
}

/// One gateway connection.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ShardConnection: Send + Sync {
    /// Open the connection. Events start flowing on the shard's channel.
    async fn connect(&mut self) -> Result<()>;

    /// Close the connection. Must be idempotent.
    async fn disconnect(&mut self) -> Result<()>;

    /// Current state.
    fn state(&self) -> ConnectionState;
}

/// A gateway connection and the stream of events it produces.
pub struct Shard {
    pub(crate) id: ShardId,
    pub(crate) connection: Box<dyn ShardConnection>,
    pub(crate) events: mpsc::Receiver<Event>,
}

impl Shard {
    pub fn new(
        id: ShardId,
        connection: Box<dyn ShardConnection>,
        events: mpsc::Receiver<Event>,
    ) -> Self {
        Self {
            id,
            connection,
            events,
        }
    }

    pub fn id(&self) -> ShardId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Close the event channel and count what was still buffered.
    pub(crate) fn discard_buffered(&mut self) -> u64 {
        self.events.close();
        let mut dropped = 0;
        while self.events.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

impl std::fmt::Debug for Shard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shard")
            .field("id", &self.id)
            .field("state", &self.connection.state())
            .finish_non_exhaustive()
    }
}

/// In-memory shards for testing.
///
/// The connection records every transition in a shared [`Journal`]; events
/// are pushed by hand through a [`ShardFeed`].
pub mod memory {
    use super::*;
    use std::sync::{Arc, Mutex, PoisonError};

    use crate::error::GatewayError;

    /// A connection transition observed by the journal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Transition {
        Connected(ShardId),
        Disconnected(ShardId),
    }

    /// Shared, ordered record of connection transitions.
    #[derive(Debug, Clone, Default)]
    pub struct Journal {
        entries: Arc<Mutex<Vec<Transition>>>,
    }

    impl Journal {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every transition so far, oldest first.
        pub fn entries(&self) -> Vec<Transition> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn record(&self, transition: Transition) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(transition);
        }
    }

    /// In-memory connection.
    pub struct MemoryConnection {
        id: ShardId,
        state: ConnectionState,
        journal: Journal,
        refuse: bool,
    }

    impl MemoryConnection {
        pub fn new(id: ShardId, journal: &Journal) -> Self {
            Self {
                id,
                state: ConnectionState::Disconnected,
                journal: journal.clone(),
                refuse: false,
            }
        }

        /// A connection whose every `connect` fails.
        pub fn refusing(id: ShardId, journal: &Journal) -> Self {
            Self {
                refuse: true,
                ..Self::new(id, journal)
            }
        }
    }

    #[async_trait]
    impl ShardConnection for MemoryConnection {
        async fn connect(&mut self) -> Result<()> {
            if self.refuse {
                return Err(GatewayError::Connection {
                    shard: self.id,
                    reason: "connection refused".into(),
                });
            }
            if self.state != ConnectionState::Connected {
                self.state = ConnectionState::Connected;
                self.journal.record(Transition::Connected(self.id));
            }
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<()> {
            if self.state != ConnectionState::Disconnected {
                self.state = ConnectionState::Disconnected;
                self.journal.record(Transition::Disconnected(self.id));
            }
            Ok(())
        }

        fn state(&self) -> ConnectionState {
            self.state
        }
    }

    /// Pushes events into a memory shard.
    #[derive(Debug, Clone)]
    pub struct ShardFeed {
        id: ShardId,
        tx: mpsc::Sender<Event>,
    }

    impl ShardFeed {
        /// Push an event, waiting for buffer space.
        pub async fn send(&self, event: Event) -> Result<()> {
            self.tx
                .send(event)
                .await
                .map_err(|_| GatewayError::StreamClosed(self.id))
        }

        /// Push an event without waiting. Fails when the buffer is full or
        /// the stream is closed.
        pub fn try_send(&self, event: Event) -> Result<()> {
            self.tx
                .try_send(event)
                .map_err(|_| GatewayError::StreamClosed(self.id))
        }
    }

    /// A shard over `connection` with an event buffer of `capacity`.
    pub fn shard_with(
        connection: MemoryConnection,
        capacity: usize,
    ) -> (Shard, ShardFeed) {
        let id = connection.id;
        let (tx, rx) = mpsc::channel(capacity);
        (
            Shard::new(id, Box::new(connection), rx),
            ShardFeed { id, tx },
        )
    }

    /// A connectable memory shard recording into `journal`.
    pub fn memory_shard(id: ShardId, capacity: usize, journal: &Journal) -> (Shard, ShardFeed) {
        shard_with(MemoryConnection::new(id, journal), capacity)
    }
}
