//! Multi-threaded update helpers.

use crate::sync::ConcurrentReducer;
use std::thread;

/// Run `threads` scoped threads, each calling `target.update(make(t, i))`
/// for `i` in `0..per_thread`, and return the update count observed
/// afterwards.
///
/// # Example
///
/// ```
/// use monofold::{Count, sync::Sharded, testing::hammer};
///
/// let counter = Sharded::with_default_shards(Count::<u8>::new());
/// assert_eq!(hammer(&counter, 4, 250, |_, _| 0), 1000);
/// ```
pub fn hammer<C, F>(target: &C, threads: usize, per_thread: usize, make: F) -> u64
where
    C: ConcurrentReducer,
    F: Fn(usize, usize) -> <C::Reducer as crate::Reducer>::Input + Sync,
{
    thread::scope(|s| {
        for t in 0..threads {
            let make = &make;
            s.spawn(move || {
                for i in 0..per_thread {
                    target.update(make(t, i));
                }
            });
        }
    });
    target.updates()
}
