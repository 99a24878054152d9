use super::{ConcurrentReducer, locks_first};
use crate::error::{MergeResult, TypeMismatchError};
use crate::reducer::Reducer;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// A reducer behind a reader-writer lock.
///
/// `update`, `merge` and `reset` take the write lock; `result` and
/// `snapshot` take the read lock and may run concurrently with each other.
/// Suits read-heavy workloads where results are polled often.
pub struct RwLocked<R> {
    inner: RwLock<R>,
    updates: AtomicU64,
}

impl<R: Reducer> RwLocked<R> {
    pub fn new(reducer: R) -> Self {
        Self {
            inner: RwLock::new(reducer),
            updates: AtomicU64::new(0),
        }
    }

    pub fn update(&self, value: R::Input) {
        self.inner.write().update(value);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Merge another wrapper's state into this one: write lock here, read
    /// lock there, taken in address order.
    pub fn merge(&self, other: &Self) -> MergeResult {
        if std::ptr::eq(self, other) {
            let copy = self.snapshot();
            return self.merge_reducer(&copy);
        }
        let (mut mine, theirs) = if locks_first(self, other) {
            let mine = self.inner.write();
            (mine, other.inner.read())
        } else {
            let theirs = other.inner.read();
            (self.inner.write(), theirs)
        };
        mine.merge(&theirs)?;
        self.updates
            .fetch_add(other.updates.load(Ordering::Relaxed), Ordering::Relaxed);
        Ok(())
    }

    pub fn merge_reducer(&self, other: &R) -> MergeResult {
        self.inner.write().merge(other)
    }

    pub fn result(&self) -> R::Output {
        self.inner.read().result()
    }

    pub fn snapshot(&self) -> R {
        self.inner.read().clone()
    }

    pub fn reset(&self) {
        let mut guard = self.inner.write();
        *guard = guard.identity();
        self.updates.store(0, Ordering::Relaxed);
    }

    pub fn swap_and_reset(&self) -> R {
        let mut guard = self.inner.write();
        let fresh = guard.identity();
        self.updates.store(0, Ordering::Relaxed);
        std::mem::replace(&mut *guard, fresh)
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Reducer + Default> Default for RwLocked<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R: Reducer> From<R> for RwLocked<R> {
    fn from(reducer: R) -> Self {
        Self::new(reducer)
    }
}

impl<R: Reducer> Clone for RwLocked<R> {
    fn clone(&self) -> Self {
        let copy = Self::new(self.snapshot());
        copy.updates.store(self.updates(), Ordering::Relaxed);
        copy
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for RwLocked<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RwLocked")
            .field("inner", &*self.inner.read())
            .field("updates", &self.updates.load(Ordering::Relaxed))
            .finish()
    }
}

impl<R> ConcurrentReducer for RwLocked<R>
where
    R: Reducer + Send + Sync,
{
    type Reducer = R;

    fn update(&self, value: R::Input) {
        Self::update(self, value);
    }

    fn snapshot(&self) -> Result<R, TypeMismatchError> {
        Ok(Self::snapshot(self))
    }

    fn updates(&self) -> u64 {
        Self::updates(self)
    }
}
