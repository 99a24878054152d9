use super::ConcurrentReducer;
use crate::error::{MergeResult, TypeMismatchError};
use crate::reducer::Reducer;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

thread_local! {
    static THREAD_HASH: u64 = {
        let mut h = DefaultHasher::new();
        std::thread::current().id().hash(&mut h);
        h.finish()
    };
}

/// One shard, aligned so neighbors do not share a cache line.
#[repr(align(64))]
struct Shard<R>(Mutex<R>);

/// N independently locked copies of a reducer.
///
/// `update` locks only the calling thread's shard, chosen by a hash of the
/// thread id, so writers on different shards never contend. Reads lock each
/// shard in turn and merge the copies into a fresh identity. A read is
/// therefore consistent per shard but not a single-instant snapshot of the
/// whole: updates landing on already-visited shards during a read are not
/// included.
///
/// The wrapped reducer's merge must be commutative; see the
/// [module docs](crate::sync#ordering).
///
/// Reads return `Result` because merging shards can fail for reducers whose
/// merge is partial, such as [`Conditional`](crate::compose::Conditional).
///
/// ```
/// use monofold::{sync::Sharded, Sum};
/// use std::thread;
///
/// let hits = Sharded::new(Sum::<u64>::new(), 8);
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             for _ in 0..1000 {
///                 hits.update(1);
///             }
///         });
///     }
/// });
/// assert_eq!(hits.result()?, 4000);
/// assert_eq!(hits.updates(), 4000);
/// # Ok::<(), monofold::TypeMismatchError>(())
/// ```
pub struct Sharded<R> {
    shards: Box<[Shard<R>]>,
    prototype: R,
    updates: AtomicU64,
}

impl<R: Reducer> Sharded<R> {
    /// `shards` copies of `prototype.identity()`; `0` means one per CPU.
    pub fn new(prototype: R, shards: usize) -> Self {
        let count = (if shards == 0 { num_cpus::get() } else { shards }).max(1);
        debug!(shards = count, "creating sharded reducer");
        let prototype = prototype.identity();
        let shards = (0..count)
            .map(|_| Shard(Mutex::new(prototype.clone())))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            prototype,
            updates: AtomicU64::new(0),
        }
    }

    /// One shard per CPU.
    pub fn with_default_shards(prototype: R) -> Self {
        Self::new(prototype, 0)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn current_shard(&self) -> &Mutex<R> {
        let hash = THREAD_HASH.with(|h| *h);
        let idx = (hash % self.shards.len() as u64) as usize;
        trace!(shard = idx, "selected shard");
        &self.shards[idx].0
    }

    pub fn update(&self, value: R::Input) {
        self.current_shard().lock().update(value);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Merge a bare reducer into the calling thread's shard.
    pub fn merge_reducer(&self, other: &R) -> MergeResult {
        self.current_shard().lock().merge(other)
    }

    /// Merge every shard of `other` into this wrapper.
    ///
    /// Shard `i` of `other` goes to shard `i % self.shard_count()`. Source
    /// shards are copied one lock at a time and combined per destination
    /// before any lock on `self` is taken. The destinations are then locked
    /// in index order and written together, so a failed merge leaves `self`
    /// unchanged.
    pub fn merge(&self, other: &Self) -> MergeResult {
        if std::ptr::eq(self, other) {
            let copy = self.snapshot()?;
            return self.merge_reducer(&copy);
        }
        if self.shard_count() != other.shard_count() {
            warn!(
                ours = self.shard_count(),
                theirs = other.shard_count(),
                "merging sharded reducers with different shard counts"
            );
        }
        let n = self.shards.len();
        let mut staged: Vec<R> = (0..n).map(|_| self.prototype.identity()).collect();
        for (i, shard) in other.shards.iter().enumerate() {
            let copy = shard.0.lock().clone();
            staged[i % n].merge(&copy)?;
        }

        let mut guards: Vec<_> = self.shards.iter().map(|s| s.0.lock()).collect();
        let merged = guards
            .iter()
            .zip(&staged)
            .map(|(dest, incoming)| (**dest).clone().merged(incoming))
            .collect::<Result<Vec<R>, _>>()?;
        for (dest, value) in guards.iter_mut().zip(merged) {
            **dest = value;
        }
        drop(guards);

        self.updates
            .fetch_add(other.updates.load(Ordering::Relaxed), Ordering::Relaxed);
        Ok(())
    }

    /// All shards merged into one reducer.
    pub fn snapshot(&self) -> Result<R, TypeMismatchError> {
        let mut acc = self.prototype.identity();
        for shard in &*self.shards {
            acc.merge(&shard.0.lock())?;
        }
        Ok(acc)
    }

    pub fn result(&self) -> Result<R::Output, TypeMismatchError> {
        Ok(self.snapshot()?.result())
    }

    /// Reset every shard to the identity.
    pub fn reset(&self) {
        for shard in &*self.shards {
            *shard.0.lock() = self.prototype.identity();
        }
        self.updates.store(0, Ordering::Relaxed);
    }

    /// Drain every shard, returning their merged state.
    ///
    /// Each shard is swapped out under its own lock, so no update is lost or
    /// counted twice, but updates racing with the drain may land on either
    /// side of it.
    pub fn swap_and_reset(&self) -> Result<R, TypeMismatchError> {
        let mut acc = self.prototype.identity();
        for shard in &*self.shards {
            let taken = std::mem::replace(&mut *shard.0.lock(), self.prototype.identity());
            acc.merge(&taken)?;
        }
        self.updates.store(0, Ordering::Relaxed);
        Ok(acc)
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn into_inner(self) -> Result<R, TypeMismatchError> {
        let mut acc = self.prototype.identity();
        for shard in self.shards {
            acc.merge(&shard.0.into_inner())?;
        }
        Ok(acc)
    }
}

impl<R: Reducer> Clone for Sharded<R> {
    fn clone(&self) -> Self {
        let shards = self
            .shards
            .iter()
            .map(|s| Shard(Mutex::new(s.0.lock().clone())))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            prototype: self.prototype.clone(),
            updates: AtomicU64::new(self.updates()),
        }
    }
}

impl<R> std::fmt::Debug for Sharded<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sharded")
            .field("shards", &self.shards.len())
            .field("updates", &self.updates.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<R> ConcurrentReducer for Sharded<R>
where
    R: Reducer + Send + Sync,
{
    type Reducer = R;

    fn update(&self, value: R::Input) {
        Self::update(self, value);
    }

    fn snapshot(&self) -> Result<R, TypeMismatchError> {
        Self::snapshot(self)
    }

    fn updates(&self) -> u64 {
        Self::updates(self)
    }
}
