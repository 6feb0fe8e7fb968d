//! Handler shapes accepted by the dispatcher.
//!
//! Two shapes exist: a notification that only learns the event happened,
//! and a payload handler that receives the event decoded into a concrete
//! type. Anything else fails to type-check at the registration site.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use cordial_core::ShardId;
use serde::de::DeserializeOwned;

use crate::error::FailureKind;

/// Return type of every handler.
pub type HandlerResult = anyhow::Result<()>;

/// Identifies one registration, for [`Dispatcher::off`](crate::Dispatcher::off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a handler sees of the dispatch that invoked it.
pub struct Context<'a, C> {
    /// Shard the event arrived on.
    pub shard: ShardId,
    /// Name of the event being dispatched.
    pub event: &'a str,
    /// The client that owns the dispatcher.
    pub client: &'a C,
}

type NotifyFn<C> = dyn Fn(&Context<'_, C>) -> HandlerResult + Send + Sync;
type PayloadFn<C> = dyn Fn(&Context<'_, C>, &Bytes) -> Result<(), FailureKind> + Send + Sync;

/// A registered callable.
pub enum Handler<C> {
    /// Zero-argument notification.
    Notify(Arc<NotifyFn<C>>),
    /// Receives the decoded payload.
    Payload(Arc<PayloadFn<C>>),
}

impl<C: 'static> Handler<C> {
    /// A handler that ignores the payload.
    pub fn notify<F>(f: F) -> Self
    where
        F: Fn(&Context<'_, C>) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Notify(Arc::new(f))
    }

    /// A handler that receives the payload decoded as JSON into `T`.
    ///
    /// A payload that does not decode is reported as
    /// [`FailureKind::Decode`] and `f` is not called.
    pub fn payload<T, F>(f: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&Context<'_, C>, T) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Payload(payload_fn(move |ctx, raw| {
            let value: T =
                serde_json::from_slice(raw).map_err(|e| FailureKind::Decode(e.to_string()))?;
            f(ctx, value).map_err(FailureKind::Failed)
        }))
    }

    pub(crate) fn call(&self, ctx: &Context<'_, C>, payload: &Bytes) -> Result<(), FailureKind> {
        match self {
            Handler::Notify(f) => f(ctx).map_err(FailureKind::Failed),
            Handler::Payload(f) => f(ctx, payload),
        }
    }
}

fn payload_fn<C, G>(g: G) -> Arc<PayloadFn<C>>
where
    G: Fn(&Context<'_, C>, &Bytes) -> Result<(), FailureKind> + Send + Sync + 'static,
{
    Arc::new(g)
}

impl<C> Clone for Handler<C> {
    fn clone(&self) -> Self {
        match self {
            Handler::Notify(f) => Handler::Notify(Arc::clone(f)),
            Handler::Payload(f) => Handler::Payload(Arc::clone(f)),
        }
    }
}

impl<C> fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Notify(_) => f.write_str("Handler::Notify"),
            Handler::Payload(_) => f.write_str("Handler::Payload"),
        }
    }
}
