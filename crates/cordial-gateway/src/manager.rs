//! Shard manager: one forwarding task per shard.
//!
//! Each running shard is drained by its own task, which hands every event to
//! the dispatcher before receiving the next one. Events of one shard are
//! therefore dispatched in arrival order while shards proceed independently.
//!
//! Shutdown is cooperative. Cancelling the manager's token stops every task
//! at its next receive; each task then closes its channel and either
//! dispatches or counts the events still buffered before disconnecting.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use cordial_core::ShardId;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::{GatewayError, Result};
use crate::shard::{ConnectionState, Shard};

/// Shard manager configuration.
#[derive(Debug, Clone)]
pub struct ShardManagerConfig {
    /// Pause between consecutive shard connects.
    pub connect_delay: Duration,
    /// Dispatch events still buffered when shutdown begins. When off they
    /// are counted as dropped.
    pub drain_on_shutdown: bool,
}

impl Default for ShardManagerConfig {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_secs(5),
            drain_on_shutdown: true,
        }
    }
}

/// Result of [`ShardManager::connect_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectReport {
    pub connected: Vec<ShardId>,
    pub failed: Vec<(ShardId, String)>,
    /// Shards not attempted because shutdown began.
    pub skipped: Vec<ShardId>,
}

/// What one shard's task did over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSummary {
    pub shard: ShardId,
    /// Events dispatched while running.
    pub forwarded: u64,
    /// Buffered events dispatched during shutdown.
    pub drained: u64,
    /// Buffered events discarded during shutdown.
    pub dropped: u64,
}

impl ShardSummary {
    fn new(shard: ShardId) -> Self {
        Self {
            shard,
            forwarded: 0,
            drained: 0,
            dropped: 0,
        }
    }
}

/// Result of [`ShardManager::shutdown`], one summary per shard in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub shards: Vec<ShardSummary>,
}

impl ShutdownReport {
    pub fn forwarded(&self) -> u64 {
        self.shards.iter().map(|s| s.forwarded).sum()
    }

    pub fn drained(&self) -> u64 {
        self.shards.iter().map(|s| s.drained).sum()
    }

    pub fn dropped(&self) -> u64 {
        self.shards.iter().map(|s| s.dropped).sum()
    }
}

struct ManagerState<C> {
    /// Added but not yet forwarding.
    idle: BTreeMap<ShardId, Shard>,
    ids: BTreeSet<ShardId>,
    client: Option<C>,
    tasks: JoinSet<ShardSummary>,
    running: bool,
    closed: bool,
}

/// Owns the client's shards and feeds their events to the dispatcher.
pub struct ShardManager<C> {
    dispatcher: Arc<Dispatcher<C>>,
    config: ShardManagerConfig,
    cancel: CancellationToken,
    state: Mutex<ManagerState<C>>,
    /// Held by `connect_all` while its shards are outside `state`.
    connecting: Mutex<()>,
}

impl<C> ShardManager<C>
where
    C: Clone + Send + Sync + 'static,
{
    pub fn new(dispatcher: Arc<Dispatcher<C>>, config: ShardManagerConfig) -> Self {
        Self {
            dispatcher,
            config,
            cancel: CancellationToken::new(),
            state: Mutex::new(ManagerState {
                idle: BTreeMap::new(),
                ids: BTreeSet::new(),
                client: None,
                tasks: JoinSet::new(),
                running: false,
                closed: false,
            }),
            connecting: Mutex::new(()),
        }
    }

    /// Take ownership of `shard`.
    ///
    /// While the manager is running the shard is connected and starts
    /// forwarding immediately; otherwise it waits for
    /// [`connect_all`](Self::connect_all) and [`run`](Self::run).
    pub async fn add_shard(&self, mut shard: Shard) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(GatewayError::ShutDown);
        }
        if state.ids.contains(&shard.id) {
            return Err(GatewayError::DuplicateShard(shard.id));
        }

        if let (true, Some(client)) = (state.running, state.client.clone()) {
            if shard.state() != ConnectionState::Connected {
                shard.connection.connect().await?;
                info!("{} connected", shard.id);
            }
            state.ids.insert(shard.id);
            self.spawn_forwarder(&mut state.tasks, shard, client);
        } else {
            debug!("{} added", shard.id);
            state.ids.insert(shard.id);
            state.idle.insert(shard.id, shard);
        }
        Ok(())
    }

    /// Connect every idle shard that is not connected yet, in ascending
    /// index order, pausing `connect_delay` between attempts.
    ///
    /// A failed connect is logged and reported; the remaining shards are
    /// still attempted. Shutdown skips the shards not yet attempted.
    ///
    /// The shards are taken out of the manager while they connect, so the
    /// manager stays usable during the pauses. They are handed back
    /// afterwards, and start forwarding if [`run`](Self::run) began
    /// meanwhile.
    pub async fn connect_all(&self) -> ConnectReport {
        let _connecting = self.connecting.lock().await;
        let mut report = ConnectReport::default();

        let mut pending: Vec<Shard> = {
            let mut state = self.state.lock().await;
            let ids: Vec<ShardId> = state
                .idle
                .iter()
                .filter(|(_, shard)| shard.state() != ConnectionState::Connected)
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| state.idle.remove(id)).collect()
        };

        let mut attempted = 0usize;
        for shard in pending.iter_mut() {
            let id = shard.id;
            if attempted > 0 && !self.config.connect_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.connect_delay) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
            if self.cancel.is_cancelled() {
                report.skipped.push(id);
                continue;
            }

            attempted += 1;
            match shard.connection.connect().await {
                Ok(()) => {
                    info!("{} connected", id);
                    report.connected.push(id);
                }
                Err(e) => {
                    warn!("{} failed to connect: {}", id, e);
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        let mut state = self.state.lock().await;
        match (state.running, state.client.clone()) {
            (true, Some(client)) => {
                for shard in pending {
                    self.spawn_forwarder(&mut state.tasks, shard, client.clone());
                }
            }
            _ => {
                for shard in pending {
                    state.idle.insert(shard.id, shard);
                }
            }
        }
        report
    }

    /// Start forwarding every shard's events with `client` as the handler
    /// context, and wait until shutdown.
    pub async fn run(&self, client: C) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(GatewayError::ShutDown);
            }
            if state.running {
                return Err(GatewayError::AlreadyRunning);
            }
            state.running = true;
            state.client = Some(client.clone());

            let idle = std::mem::take(&mut state.idle);
            info!("forwarding {} shard(s)", idle.len());
            for shard in idle.into_values() {
                self.spawn_forwarder(&mut state.tasks, shard, client.clone());
            }
        }

        self.cancel.cancelled().await;
        Ok(())
    }

    /// Stop every shard and wait for its task to finish.
    ///
    /// Idempotent: later calls return an empty report.
    pub async fn shutdown(&self) -> ShutdownReport {
        self.cancel.cancel();
        drop(self.connecting.lock().await);

        let mut state = self.state.lock().await;
        if state.closed {
            return ShutdownReport::default();
        }
        state.closed = true;

        let mut shards = Vec::with_capacity(state.ids.len());
        for (id, mut shard) in std::mem::take(&mut state.idle) {
            let mut summary = ShardSummary::new(id);
            summary.dropped = shard.discard_buffered();
            if let Err(e) = shard.connection.disconnect().await {
                warn!("{} failed to disconnect: {}", id, e);
            }
            shards.push(summary);
        }

        while let Some(joined) = state.tasks.join_next().await {
            match joined {
                Ok(summary) => shards.push(summary),
                Err(e) => error!("shard task failed: {}", e),
            }
        }
        shards.sort_by_key(|s| s.shard);
        state.client = None;
        state.running = false;

        let report = ShutdownReport { shards };
        info!(
            "shard manager shut down: {} forwarded, {} drained, {} dropped",
            report.forwarded(),
            report.drained(),
            report.dropped()
        );
        report
    }

    /// Indices of every managed shard, ascending.
    pub async fn shard_ids(&self) -> Vec<ShardId> {
        self.state.lock().await.ids.iter().copied().collect()
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.running
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn spawn_forwarder(&self, tasks: &mut JoinSet<ShardSummary>, shard: Shard, client: C) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let cancel = self.cancel.clone();
        let drain = self.config.drain_on_shutdown;
        tasks.spawn(forward(shard, dispatcher, client, cancel, drain));
    }
}

async fn forward<C: 'static>(
    mut shard: Shard,
    dispatcher: Arc<Dispatcher<C>>,
    client: C,
    cancel: CancellationToken,
    drain: bool,
) -> ShardSummary {
    let id = shard.id;
    let mut summary = ShardSummary::new(id);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = shard.events.recv() => match next {
                Some(event) => {
                    dispatcher.dispatch(id, &event, &client);
                    summary.forwarded += 1;
                }
                None => {
                    debug!("{} event stream closed", id);
                    break;
                }
            },
        }
    }

    shard.events.close();
    while let Ok(event) = shard.events.try_recv() {
        if drain && !dispatcher.is_shut_down() {
            dispatcher.dispatch(id, &event, &client);
            summary.drained += 1;
        } else {
            summary.dropped += 1;
        }
    }

    if let Err(e) = shard.connection.disconnect().await {
        warn!("{} failed to disconnect: {}", id, e);
    }
    debug!(
        "{} stopped: {} forwarded, {} drained, {} dropped",
        id, summary.forwarded, summary.drained, summary.dropped
    );
    summary
}
