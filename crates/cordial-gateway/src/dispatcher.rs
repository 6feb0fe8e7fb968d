//! Event-name keyed handler registry.
//!
//! The registry is guarded by one mutex. A dispatch snapshots the recurring
//! handlers and *removes* the one-shot handlers for its event name while
//! holding the lock, then invokes them with the lock released. Two shards
//! dispatching the same name concurrently therefore can never both see the
//! same one-shot handler, and a handler may register further handlers
//! without deadlocking.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use cordial_core::{Event, ShardId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, trace, warn};

use crate::error::{FailureKind, HandlerFailure};
use crate::handler::{Context, Handler, ListenerId};

/// Where handler failures are delivered.
pub type ErrorSink = UnboundedSender<HandlerFailure>;

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Catch handler panics and report them as failures. When off, a
    /// panicking handler unwinds through the caller of `dispatch`.
    pub catch_panics: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { catch_panics: true }
    }
}

/// What one call to [`Dispatcher::dispatch`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Handlers invoked, including those that failed.
    pub invoked: usize,
    /// Handlers that failed.
    pub failed: usize,
}

struct Entry<C> {
    id: ListenerId,
    handler: Handler<C>,
}

impl<C> Clone for Entry<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: self.handler.clone(),
        }
    }
}

struct Registry<C> {
    recurring: HashMap<String, Vec<Entry<C>>>,
    once: HashMap<String, Vec<Entry<C>>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            recurring: HashMap::new(),
            once: HashMap::new(),
        }
    }
}

/// Routes events to the handlers registered under their name.
///
/// `C` is the client type handed to every handler through [`Context`].
pub struct Dispatcher<C> {
    registry: Mutex<Registry<C>>,
    next_id: AtomicU64,
    shutdown: AtomicBool,
    sink: ErrorSink,
    config: DispatcherConfig,
}

impl<C: 'static> Dispatcher<C> {
    /// Create a dispatcher reporting handler failures to `sink`.
    pub fn new(config: DispatcherConfig, sink: ErrorSink) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            next_id: AtomicU64::new(1),
            shutdown: AtomicBool::new(false),
            sink,
            config,
        }
    }

    /// Register `handler` for every future dispatch of `event`.
    ///
    /// After shutdown the registration is ignored; the returned id matches
    /// nothing.
    pub fn on(&self, event: impl Into<String>, handler: Handler<C>) -> ListenerId {
        self.register(event.into(), handler, false)
    }

    /// Register `handler` for the next dispatch of `event` only.
    pub fn once(&self, event: impl Into<String>, handler: Handler<C>) -> ListenerId {
        self.register(event.into(), handler, true)
    }

    /// Remove a registration. Returns whether it was still present.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.lock();
        let Registry { recurring, once } = &mut *registry;
        for table in [recurring, once] {
            for entries in table.values_mut() {
                if let Some(pos) = entries.iter().position(|e| e.id == id) {
                    entries.remove(pos);
                    return true;
                }
            }
        }
        false
    }

    /// Invoke every handler registered for `event.name`.
    ///
    /// Recurring handlers run first, in registration order, then the
    /// one-shot handlers, which are consumed by this call. Handler failures
    /// are reported on the error sink and never stop the remaining handlers.
    pub fn dispatch(&self, shard: ShardId, event: &Event, client: &C) -> DispatchOutcome {
        if self.is_shut_down() {
            trace!("{} dropped {} after shutdown", shard, event.name);
            return DispatchOutcome::default();
        }

        let (recurring, once) = {
            let mut registry = self.lock();
            let recurring = registry
                .recurring
                .get(&event.name)
                .cloned()
                .unwrap_or_default();
            let once = registry.once.remove(&event.name).unwrap_or_default();
            (recurring, once)
        };

        let mut outcome = DispatchOutcome::default();
        if recurring.is_empty() && once.is_empty() {
            return outcome;
        }

        let ctx = Context {
            shard,
            event: &event.name,
            client,
        };

        for entry in recurring.iter().chain(once.iter()) {
            outcome.invoked += 1;
            if let Err(kind) = self.invoke(entry, &ctx, event) {
                outcome.failed += 1;
                self.report(HandlerFailure {
                    event: event.name.clone(),
                    shard,
                    listener: entry.id,
                    kind,
                });
            }
        }

        debug!(
            "{} dispatched {} to {} handler(s), {} failed",
            shard, event.name, outcome.invoked, outcome.failed
        );
        outcome
    }

    /// Stop accepting registrations and dispatches, and drop every handler.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut registry = self.lock();
        registry.recurring.clear();
        registry.once.clear();
        debug!("dispatcher shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Number of recurring handlers registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().recurring.get(event).map_or(0, Vec::len)
    }

    /// Number of one-shot handlers still pending for `event`.
    pub fn once_count(&self, event: &str) -> usize {
        self.lock().once.get(event).map_or(0, Vec::len)
    }

    fn register(&self, event: String, handler: Handler<C>, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut registry = self.lock();
        // Checked under the lock so a registration cannot slip in after
        // `shutdown` has cleared the tables.
        if self.is_shut_down() {
            trace!("ignoring registration for {} after shutdown", event);
            return id;
        }

        let table = if once {
            &mut registry.once
        } else {
            &mut registry.recurring
        };
        trace!("registered {} for {} (once: {})", id, event, once);
        table.entry(event).or_default().push(Entry { id, handler });
        id
    }

    fn invoke(
        &self,
        entry: &Entry<C>,
        ctx: &Context<'_, C>,
        event: &Event,
    ) -> Result<(), FailureKind> {
        if !self.config.catch_panics {
            return entry.handler.call(ctx, &event.payload);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| entry.handler.call(ctx, &event.payload))) {
            Ok(result) => result,
            Err(payload) => Err(FailureKind::Panicked(panic_message(payload.as_ref()))),
        }
    }

    fn report(&self, failure: HandlerFailure) {
        warn!("{}", failure);
        if let Err(unsent) = self.sink.send(failure) {
            error!("error sink closed, dropping failure: {}", unsent.0);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry<C>> {
        // Handlers never run under this lock, so poisoning can only come
        // from a panic inside the registry bookkeeping itself.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
