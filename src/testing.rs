//! Testing utilities for reducers.
//!
//! Helpers for checking user-defined reducers against the monoid contract
//! and for generating the kind of numeric data that breaks naive
//! accumulators:
//!
//! - **Assertions**: tolerance comparisons and law checks that panic with
//!   a readable message.
//! - **Test data builders**: fluent construction of input streams.
//! - **Fixtures**: ill-conditioned sums, skewed shards, alternating
//!   magnitudes.
//! - **Stress**: hammer a [`ConcurrentReducer`](crate::sync::ConcurrentReducer)
//!   from several threads and check nothing was lost.
//!
//! # Quick Start
//!
//! ```
//! use monofold::KbnSum;
//! use monofold::testing::*;
//!
//! let data = TestDataBuilder::new()
//!     .add_values(repeated_tenths(10))
//!     .add_repeated(0.5, 10)
//!     .build();
//!
//! assert_identity_laws(&KbnSum::from_value(3.0), 0.0);
//! assert_merge_consistent(&KbnSum::new(), &data, 1e-12);
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod stress;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use stress::*;
