//! Built-in reducers.
//!
//! Every type here implements [`Reducer`](crate::Reducer) and is a plain value:
//! `Clone`, serializable with `serde`, and free of internal synchronization.
//!
//! - [`KbnSum`] -- compensated (Neumaier) floating-point sum.
//! - [`Welford`] -- online mean and variance.
//! - [`Ema`] -- exponential moving average and volatility.
//! - [`Covariance`] -- online covariance, correlation and linear fit over `(x, y)`.
//! - [`Histogram`] -- fixed equal-width bins with under/overflow.
//! - [`P2Quantile`] -- constant-space single quantile estimate.
//! - [`ReservoirQuantile`] -- quantiles over a seeded uniform sample.
//! - [`Sum<T>`], [`Count<T>`], [`Min<T>`], [`Max<T>`], [`MinMax<T>`], [`Product`].
//!
//! Reducers with parameters validate them on construction and return
//! [`ConfigurationError`](crate::ConfigurationError); the parameter-free ones
//! construct infallibly through `new()` / `Default`.
//!
//! # Examples
//! ```
//! use monofold::{Reducer, Welford, Histogram, P2Quantile};
//!
//! let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
//!
//! let mut w = Welford::new();
//! w.update_all(data);
//! assert!((w.std_dev() - 2.0).abs() < 1e-12);
//!
//! let mut h = Histogram::new(0.0, 10.0, 5)?;
//! h.update_all(data);
//! assert_eq!(h.bin_count(2), 5);
//!
//! let mut q = P2Quantile::new(0.5)?;
//! q.update_all(data);
//! assert!(q.result() >= 4.0 && q.result() <= 5.0);
//! # Ok::<(), monofold::ConfigurationError>(())
//! ```

mod basic;
mod covariance;
mod histogram;
mod kbn;
mod quantiles;
mod statistical;

pub use basic::{Count, Max, Min, MinMax, Product, Sum};
pub use covariance::Covariance;
pub use histogram::Histogram;
pub use kbn::KbnSum;
pub use quantiles::{P2Quantile, ReservoirQuantile};
pub use statistical::{Ema, Welford};
