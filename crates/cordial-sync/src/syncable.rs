//! The synchronization capability.

use async_trait::async_trait;
use cordial_core::Entity;
use cordial_rest::Requester;

use crate::error::Result;

/// An entity that can be written back to the server.
///
/// Both operations are terminal: they either succeed or leave the entity
/// exactly as it was. Retrying is the transport's business.
#[async_trait]
pub trait Syncable: Entity {
    /// Create the entity on the server when `changes` is `None`, otherwise
    /// send the fields of `changes` that differ from this bound value.
    ///
    /// On success every server-returned field is copied onto `self` and
    /// `self` becomes bound to the server id.
    async fn persist(&mut self, rest: &dyn Requester, changes: Option<&dyn Entity>) -> Result<()>;

    /// Delete the entity on the server.
    async fn remove(&self, rest: &dyn Requester) -> Result<()>;
}

/// Create or update `entity`. See [`Syncable::persist`].
pub async fn persist<E: Syncable + ?Sized>(
    rest: &dyn Requester,
    entity: &mut E,
    changes: Option<&dyn Entity>,
) -> Result<()> {
    entity.persist(rest, changes).await
}

/// Delete `entity`. See [`Syncable::remove`].
pub async fn remove<E: Syncable + ?Sized>(rest: &dyn Requester, entity: &E) -> Result<()> {
    entity.remove(rest).await
}

/// Whether `candidate` was derived from the server entity `reference` holds.
///
/// True exactly when `candidate`'s copy marker equals `reference`'s id. A
/// detached candidate is never a copy of anything.
pub fn is_stale_copy_of(candidate: &dyn Entity, reference: &dyn Entity) -> bool {
    candidate.is_copy_of(reference)
}
