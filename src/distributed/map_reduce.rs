use super::tree::{linear_merge, par_tree_merge, tree_merge};
use crate::error::TypeMismatchError;
use crate::reducer::{Reducer, fold};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// How `MapReduce` combines its per-chunk partial reducers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeStrategy {
    /// Left fold over the partials, in chunk order.
    Linear,
    /// Sequential pairwise tree (see [`tree_merge`]).
    #[default]
    Tree,
    /// Pairwise tree with each level merged on the rayon pool.
    ParallelTree,
}

/// Split `len` items into `parts` contiguous ranges whose sizes differ by at
/// most one; the first `len % parts` ranges get the extra item.
///
/// Returns fewer than `parts` ranges when `len < parts` (never an empty
/// range), and none when `len == 0`.
pub fn chunk_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1).min(len);
    if parts == 0 {
        return Vec::new();
    }
    let base = len / parts;
    let extra = len % parts;
    let mut start = 0;
    (0..parts)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let r = start..start + size;
            start += size;
            r
        })
        .collect()
}

/// Parallel fold over finite data.
///
/// The input is cut into one contiguous chunk per worker, each chunk is
/// folded into a fresh identity of the prototype on the rayon pool, and the
/// partial reducers are merged with the configured [`MergeStrategy`]. The
/// calling thread blocks until every chunk is done.
///
/// Since chunks are contiguous and merged in order, the result equals a
/// sequential fold up to the reducer's merge tolerance.
///
/// ```
/// use monofold::{distributed::MapReduce, KbnSum, Reducer};
///
/// let data: Vec<f64> = (1..=1000).map(f64::from).collect();
/// let total = MapReduce::new(KbnSum::new()).workers(4).fold_slice(&data)?;
/// assert_eq!(total.result(), 500_500.0);
/// # Ok::<(), monofold::TypeMismatchError>(())
/// ```
#[derive(Clone, Debug)]
pub struct MapReduce<R> {
    prototype: R,
    workers: usize,
    strategy: MergeStrategy,
}

impl<R> MapReduce<R>
where
    R: Reducer + Send + Sync,
{
    /// One worker per CPU, tree merge.
    pub fn new(prototype: R) -> Self {
        Self {
            prototype: prototype.identity(),
            workers: 0,
            strategy: MergeStrategy::default(),
        }
    }

    /// Number of chunks; `0` means one per CPU.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The worker count after resolving `0`.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    pub const fn merge_strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Fold every element of `data`.
    pub fn fold_slice(&self, data: &[R::Input]) -> Result<R, TypeMismatchError>
    where
        R::Input: Clone + Sync,
    {
        self.fold_mapped(data, |x: &R::Input| x.clone())
    }

    /// Fold `mapper(x)` for every `x` in `data`.
    pub fn fold_mapped<T, F>(&self, data: &[T], mapper: F) -> Result<R, TypeMismatchError>
    where
        T: Sync,
        F: Fn(&T) -> R::Input + Sync,
    {
        self.run(data.len(), |range| {
            fold(&self.prototype, data[range].iter().map(&mapper))
        })
    }

    /// Fold `generate(i)` for every `i` in `range`.
    pub fn fold_range<F>(&self, range: Range<usize>, generate: F) -> Result<R, TypeMismatchError>
    where
        F: Fn(usize) -> R::Input + Sync,
    {
        let offset = range.start;
        self.run(range.len(), |chunk| {
            fold(
                &self.prototype,
                (chunk.start + offset..chunk.end + offset).map(&generate),
            )
        })
    }

    fn run<F>(&self, len: usize, fold_chunk: F) -> Result<R, TypeMismatchError>
    where
        F: Fn(Range<usize>) -> R + Sync,
    {
        let workers = self.effective_workers();
        if len < workers {
            debug!(len, workers, "input smaller than worker count; folding sequentially");
            return Ok(if len == 0 {
                self.prototype.identity()
            } else {
                fold_chunk(0..len)
            });
        }

        let ranges = chunk_ranges(len, workers);
        debug!(
            len,
            chunks = ranges.len(),
            chunk_len = ranges.first().map_or(0, |r| r.len()),
            "map-reduce partitioned input"
        );
        let partials: Vec<R> = ranges.into_par_iter().map(&fold_chunk).collect();

        match self.strategy {
            MergeStrategy::Linear => linear_merge(&self.prototype, partials),
            MergeStrategy::Tree => tree_merge(&self.prototype, partials),
            MergeStrategy::ParallelTree => par_tree_merge(&self.prototype, partials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_balanced_and_contiguous() {
        let r = chunk_ranges(10, 3);
        assert_eq!(r, vec![0..4, 4..7, 7..10]);
        assert_eq!(chunk_ranges(2, 5), vec![0..1, 1..2]);
        assert!(chunk_ranges(0, 4).is_empty());
        assert_eq!(chunk_ranges(5, 0), vec![0..5]);
    }
}
