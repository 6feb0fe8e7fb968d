//! The Client: one dispatcher, one shard manager, one guild cache.
//!
//! Every component that registers or triggers handlers receives the
//! client's own [`Dispatcher`]; nothing is process-wide.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use cordial_core::{Entity, Event, ShardId, Snowflake};
use cordial_gateway::{
    ConnectReport, DispatchOutcome, Dispatcher, Handler, HandlerFailure, ListenerId, Shard,
    ShardManager, ShutdownReport,
};
use cordial_rest::Requester;
use cordial_sync::Syncable;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{info, warn};

use crate::cache::ConnectedGuilds;
use crate::config::ClientConfig;
use crate::error::Result;

struct ClientInner {
    config: ClientConfig,
    dispatcher: Arc<Dispatcher<Client>>,
    shards: ShardManager<Client>,
    guilds: Arc<ConnectedGuilds>,
    rest: Arc<dyn Requester>,
    errors: Mutex<Option<UnboundedReceiver<HandlerFailure>>>,
}

/// The main Client struct.
///
/// Cheap to clone; every clone drives the same dispatcher, shards and
/// cache. Handlers receive a clone through [`Context::client`].
///
/// [`Context::client`]: cordial_gateway::Context::client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Create a client with no shards.
    ///
    /// The guild tracking handlers are registered before this returns.
    pub fn new(config: ClientConfig, rest: Arc<dyn Requester>) -> Result<Self> {
        config.validate()?;

        let (errors_tx, errors_rx) = unbounded_channel();
        let dispatcher = Arc::new(Dispatcher::new(config.dispatcher.clone(), errors_tx));
        let guilds = Arc::new(ConnectedGuilds::new());
        guilds.attach(&dispatcher);
        let shards = ShardManager::new(Arc::clone(&dispatcher), config.shards.clone());

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                dispatcher,
                shards,
                guilds,
                rest,
                errors: Mutex::new(Some(errors_rx)),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Handlers
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a handler for every dispatch of `event`.
    pub fn on(&self, event: impl Into<String>, handler: Handler<Client>) -> ListenerId {
        self.inner.dispatcher.on(event, handler)
    }

    /// Register a handler for the next dispatch of `event` only.
    pub fn once(&self, event: impl Into<String>, handler: Handler<Client>) -> ListenerId {
        self.inner.dispatcher.once(event, handler)
    }

    /// Remove a registration.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.dispatcher.off(id)
    }

    /// Dispatch `event` as if it had arrived on `shard`.
    pub fn dispatch(&self, shard: ShardId, event: &Event) -> DispatchOutcome {
        self.inner.dispatcher.dispatch(shard, event, self)
    }

    pub fn dispatcher(&self) -> &Dispatcher<Client> {
        &self.inner.dispatcher
    }

    /// Take the receiving end of the handler failure sink.
    ///
    /// Only the first call returns `Some`. Failures sent while nobody holds
    /// the receiver are buffered.
    pub fn take_errors(&self) -> Option<UnboundedReceiver<HandlerFailure>> {
        self.inner
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shards
    // ─────────────────────────────────────────────────────────────────────────

    /// Hand `shard` to the shard manager.
    pub async fn add_shard(&self, shard: Shard) -> Result<()> {
        Ok(self.inner.shards.add_shard(shard).await?)
    }

    /// Connect every shard that is not connected yet.
    pub async fn connect_shards(&self) -> ConnectReport {
        self.inner.shards.connect_all().await
    }

    /// Connect the shards and forward their events until [`shutdown`].
    ///
    /// [`shutdown`]: Self::shutdown
    pub async fn run(&self) -> Result<()> {
        let report = self.connect_shards().await;
        if !report.failed.is_empty() {
            warn!("{} shard(s) failed to connect", report.failed.len());
        }
        Ok(self.inner.shards.run(self.clone()).await?)
    }

    /// Stop the shards, then the dispatcher.
    ///
    /// Buffered events are drained into the still-live dispatcher before
    /// it stops. Later calls to `on`, `once` and `dispatch` are ignored.
    pub async fn shutdown(&self) -> ShutdownReport {
        let report = self.inner.shards.shutdown().await;
        self.inner.dispatcher.shutdown();
        info!("client shut down");
        report
    }

    pub async fn shard_ids(&self) -> Vec<ShardId> {
        self.inner.shards.shard_ids().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────

    /// Ids of the guilds the client is connected to, ascending.
    pub fn connected_guilds(&self) -> Vec<Snowflake> {
        self.inner.guilds.ids()
    }

    pub fn guilds(&self) -> &ConnectedGuilds {
        &self.inner.guilds
    }

    pub fn rest(&self) -> &dyn Requester {
        self.inner.rest.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Synchronization
    // ─────────────────────────────────────────────────────────────────────────

    /// Create `entity` on the server, or update it with `changes`.
    pub async fn save<E: Syncable + ?Sized>(
        &self,
        entity: &mut E,
        changes: Option<&dyn Entity>,
    ) -> Result<()> {
        Ok(cordial_sync::persist(self.rest(), entity, changes).await?)
    }

    /// Delete `entity` on the server.
    pub async fn delete<E: Syncable + ?Sized>(&self, entity: &E) -> Result<()> {
        Ok(cordial_sync::remove(self.rest(), entity).await?)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("guilds", &self.inner.guilds.len())
            .finish_non_exhaustive()
    }
}
