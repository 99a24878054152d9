//! Thread-safe wrappers around a [`Reducer`].
//!
//! Base reducers carry no synchronization. To share one between threads,
//! wrap it:
//!
//! - [`Locked`]: one exclusive lock around every operation.
//! - [`RwLocked`]: exclusive lock for update/merge, shared lock for reads.
//! - [`Sharded`]: N independently locked copies; each thread updates "its"
//!   shard and reads merge all shards.
//!
//! All three take `&self` for every operation and are meant to live behind
//! an `Arc` or a scoped borrow. Locks are `parking_lot` locks, so there is no
//! poisoning; a panicking writer leaves the state as it was at the panic.
//!
//! # Ordering
//!
//! Updates through `Locked`/`RwLocked` are applied in lock-acquisition order.
//! `Sharded` applies updates in per-shard order only, and its read path
//! merges shards in index order. Only shard reducers whose merge is
//! commutative (sums, counts, extrema, moments): an order-sensitive reducer
//! such as [`Ema`](crate::Ema) gives results that depend on thread
//! scheduling. The wrapper does not check this.
//!
//! # Deadlock freedom
//!
//! `Locked` and `RwLocked` lock both wrappers in ascending address order.
//! `Sharded` copies the source shards before locking any of its own, so it
//! never holds locks on both sides. Either way concurrent `a.merge(&b)` and
//! `b.merge(&a)` cannot deadlock. Merging a wrapper with itself merges a
//! snapshot.

mod locked;
mod rwlocked;
mod sharded;

pub use locked::Locked;
pub use rwlocked::RwLocked;
pub use sharded::Sharded;

use crate::error::TypeMismatchError;
use crate::reducer::Reducer;

/// The `&self` interface shared by the wrappers.
///
/// Lets code drive any wrapper generically, e.g. a writer pool that does not
/// care how its target is synchronized.
pub trait ConcurrentReducer: Send + Sync {
    type Reducer: Reducer;

    /// Fold one datum in.
    fn update(&self, value: <Self::Reducer as Reducer>::Input);

    /// An independent copy of the accumulated state.
    fn snapshot(&self) -> Result<Self::Reducer, TypeMismatchError>;

    /// Number of updates applied since construction or the last reset.
    fn updates(&self) -> u64;

    /// The result over everything accumulated so far.
    fn result(&self) -> Result<<Self::Reducer as Reducer>::Output, TypeMismatchError> {
        Ok(self.snapshot()?.result())
    }
}

/// Whether `a` must be locked before `b`.
pub(crate) fn locks_first<T>(a: &T, b: &T) -> bool {
    std::ptr::from_ref(a).addr() < std::ptr::from_ref(b).addr()
}
