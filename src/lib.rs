//! # Monofold
//!
//! **Composable streaming reducers** for Rust. A reducer is a small
//! accumulator that folds a stream one value at a time, in constant memory,
//! and that can be *merged* with another reducer built over a different
//! slice of the stream. Because merging is associative and every reducer has
//! an identity, one algebra covers single-threaded folds, sharded concurrent
//! updates, and partitioned map-reduce.
//!
//! ## Key Features
//!
//! - **Numerically careful statistics** - compensated sums, Welford
//!   moments, covariance and regression, exponential moving averages
//! - **Streaming quantiles** - P² markers and mergeable reservoirs
//! - **Histograms** - fixed bins with under/overflow, CDF and quantile queries
//! - **Composition** - parallel, sequential, conditional and N-ary fan-out,
//!   all reducers themselves
//! - **Concurrency** - mutex, reader-writer and sharded wrappers
//! - **Partitioned folds** - rayon-backed map-reduce with tree merging
//! - **Windows** - count-based and time-based
//!
//! ## Quick Start
//!
//! ```
//! use monofold::compose::ReducerExt;
//! use monofold::{Histogram, KbnSum, Reducer, Welford, fold};
//!
//! # fn main() -> Result<(), monofold::ReducerError> {
//! let latencies = [12.0, 15.0, 11.0, 40.0, 13.0];
//!
//! // One pass, three statistics.
//! let stats = fold(
//!     &KbnSum::new().and(Welford::new()).and(Histogram::new(0.0, 50.0, 5)?),
//!     latencies,
//! );
//! let (total, mean) = stats.first().result();
//! assert_eq!(total, 91.0);
//! assert!((mean - 18.2).abs() < 1e-12);
//! assert_eq!(stats.second().bin_count(1), 4);
//!
//! // Split the stream, fold each half, merge: same answer.
//! let (a, b) = latencies.split_at(2);
//! let merged = fold(&Welford::new(), a.iter().copied())
//!     .merged(&fold(&Welford::new(), b.iter().copied()))?;
//! assert!((merged.mean() - 18.2).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Reducer
//!
//! [`Reducer`] has four operations: `identity`, `update`, `merge` and
//! `result`. Reducers are plain `Clone` values without interior locking.
//!
//! ### Composition
//!
//! [`compose`] builds new reducers out of existing ones; [`algebra`] holds
//! the functor map, the constant reducer and law checkers.
//!
//! ### Concurrency and distribution
//!
//! [`sync`] wraps a reducer for shared updates from many threads.
//! [`distributed`] splits finite data into chunks, folds them on the rayon
//! pool, and merges the partials.
//!
//! ### Windows
//!
//! [`window`] restricts a reducer to the most recent values, by count or by
//! age.
//!
//! ## Feature flags
//!
//! - `diagnostics` (default) - the [`diagnostics`] module for text and JSON
//!   reports over reducer results.

pub mod algebra;
pub mod compose;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod distributed;
pub mod error;
pub mod reducer;
pub mod reducers;
pub mod sync;
pub mod testing;
pub mod window;

pub use error::{ConfigurationError, MergeResult, ReducerError, TypeMismatchError};
pub use reducer::{Reducer, fold, fold_from};
pub use reducers::{
    Count, Covariance, Ema, Histogram, KbnSum, Max, Min, MinMax, P2Quantile, Product,
    ReservoirQuantile, Sum, Welford,
};
