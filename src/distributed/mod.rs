//! Partitioned folding and merging of partial reducers.
//!
//! - [`MapReduce`] folds contiguous chunks of a slice or index range on the
//!   rayon pool and merges the partials.
//! - [`linear_merge`], [`tree_merge`] and [`par_tree_merge`] combine a list
//!   of partial reducers produced anywhere (other processes, files, shards).
//!
//! Correctness rests entirely on the reducer's monoid contract: identity is
//! neutral and merge is associative. Order-sensitive reducers stay correct
//! because chunks are contiguous and every merge keeps partition order.

mod map_reduce;
mod tree;

pub use map_reduce::{MapReduce, MergeStrategy, chunk_ranges};
pub use tree::{linear_merge, par_tree_merge, tree_merge};
