use super::{ConcurrentReducer, locks_first};
use crate::error::{MergeResult, TypeMismatchError};
use crate::reducer::Reducer;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// A reducer behind a single exclusive lock.
///
/// ```
/// use monofold::{sync::Locked, KbnSum};
/// use std::thread;
///
/// let total = Locked::new(KbnSum::new());
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             for _ in 0..100 {
///                 total.update(0.5);
///             }
///         });
///     }
/// });
/// assert_eq!(total.result(), 200.0);
/// assert_eq!(total.updates(), 400);
/// ```
pub struct Locked<R> {
    inner: Mutex<R>,
    updates: AtomicU64,
}

impl<R: Reducer> Locked<R> {
    pub fn new(reducer: R) -> Self {
        Self {
            inner: Mutex::new(reducer),
            updates: AtomicU64::new(0),
        }
    }

    pub fn update(&self, value: R::Input) {
        self.inner.lock().update(value);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Merge another wrapper's state into this one.
    ///
    /// Both locks are taken in address order; a self-merge merges a snapshot.
    pub fn merge(&self, other: &Self) -> MergeResult {
        if std::ptr::eq(self, other) {
            let copy = self.snapshot();
            return self.merge_reducer(&copy);
        }
        let (mut mine, theirs) = if locks_first(self, other) {
            let mine = self.inner.lock();
            (mine, other.inner.lock())
        } else {
            let theirs = other.inner.lock();
            (self.inner.lock(), theirs)
        };
        mine.merge(&theirs)?;
        self.updates
            .fetch_add(other.updates.load(Ordering::Relaxed), Ordering::Relaxed);
        Ok(())
    }

    /// Merge a bare reducer into the wrapped state.
    pub fn merge_reducer(&self, other: &R) -> MergeResult {
        self.inner.lock().merge(other)
    }

    pub fn result(&self) -> R::Output {
        self.inner.lock().result()
    }

    /// A copy of the wrapped reducer.
    pub fn snapshot(&self) -> R {
        self.inner.lock().clone()
    }

    /// Replace the state with its identity.
    pub fn reset(&self) {
        let mut guard = self.inner.lock();
        *guard = guard.identity();
        self.updates.store(0, Ordering::Relaxed);
    }

    /// Take the accumulated state, leaving the identity behind, in one
    /// critical section.
    pub fn swap_and_reset(&self) -> R {
        let mut guard = self.inner.lock();
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

impl<R: Reducer + Default> Default for Locked<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R: Reducer> From<R> for Locked<R> {
    fn from(reducer: R) -> Self {
        Self::new(reducer)
    }
}

impl<R: Reducer> Clone for Locked<R> {
    fn clone(&self) -> Self {
        let copy = Self::new(self.snapshot());
        copy.updates.store(self.updates(), Ordering::Relaxed);
        copy
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for Locked<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locked")
            .field("inner", &*self.inner.lock())
            .field("updates", &self.updates.load(Ordering::Relaxed))
            .finish()
    }
}

impl<R> ConcurrentReducer for Locked<R>
where
    R: Reducer + Send,
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
