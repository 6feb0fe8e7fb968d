//! Copy semantics for syncable entities.
//!
//! Every entity kind provides an explicit field-by-field copy ([`DeepCopy`]).
//! The copy never duplicates the optimistic-concurrency token: the
//! destination's `copy_of` is recomputed from the source's id.
//!
//! [`Entity`] is the object-safe view of the same capability, used where the
//! entity kind is only known at runtime. Kind mismatches surface as
//! [`CoreError::UnsupportedOperand`].

use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CoreError, Result};
use crate::types::Snowflake;

/// Explicit per-kind copy into independent storage.
pub trait DeepCopy: Sized {
    /// Name of the entity kind, used in error reports.
    const KIND: &'static str;

    /// Overwrite every field of `dest` with a copy of this value and mark
    /// `dest` as a copy of this value's id.
    fn copy_into(&self, dest: &mut Self);

    /// A fresh value holding a copy of this one.
    fn duplicate(&self) -> Self;
}

/// Object-safe entity capability.
pub trait Entity: Any + Send + Sync {
    /// Name of the entity kind.
    fn kind(&self) -> &'static str;

    /// The server-assigned id (empty when detached).
    fn entity_id(&self) -> Snowflake;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Copy this entity onto `other`, which must be of the same kind.
    fn copy_over_to(&self, other: &mut dyn Entity) -> Result<()>;

    /// Whether this value was derived from the server entity `other` holds.
    fn is_copy_of(&self, other: &dyn Entity) -> bool;
}

/// Downcast a dynamic entity to a concrete kind.
pub fn downcast_ref<T: Entity + DeepCopy>(entity: &dyn Entity) -> Result<&T> {
    let actual = entity.kind();
    entity
        .as_any()
        .downcast_ref::<T>()
        .ok_or(CoreError::UnsupportedOperand {
            expected: T::KIND,
            actual,
        })
}

/// Mutable variant of [`downcast_ref`].
pub fn downcast_mut<T: Entity + DeepCopy>(entity: &mut dyn Entity) -> Result<&mut T> {
    let actual = entity.kind();
    entity
        .as_any_mut()
        .downcast_mut::<T>()
        .ok_or(CoreError::UnsupportedOperand {
            expected: T::KIND,
            actual,
        })
}

/// A value shared between tasks behind a reader-writer lock.
///
/// Entities handed to application code are plain owned values. When an
/// application shares one across tasks it wraps it in `Locked`, and copies
/// between wrapped values take a read lock on the source and a write lock on
/// the destination for the duration of the copy.
pub struct Locked<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Locked<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Acquire a read lock.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a write lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl<T: DeepCopy> Locked<T> {
    /// Overwrite this value with a copy of `source`.
    ///
    /// Copying a handle onto itself is a no-op.
    pub fn copy_from(&self, source: &Locked<T>) {
        if self.ptr_eq(source) {
            return;
        }

        // Locks are always taken in address order.
        if source.addr() < self.addr() {
            let src = source.read();
            let mut dst = self.write();
            src.copy_into(&mut dst);
        } else {
            let mut dst = self.write();
            let src = source.read();
            src.copy_into(&mut dst);
        }
    }

    /// An independent copy of the current value.
    pub fn snapshot(&self) -> T {
        self.read().duplicate()
    }
}

impl<T> Clone for Locked<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Locked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
