//! Composition combinators.
//!
//! Every combinator is itself a [`Reducer`], so compositions nest freely:
//!
//! | Combinator | Built with | Update | Result |
//! |---|---|---|---|
//! | [`Parallel`] | `a.and(b)` | datum to both | `(ra, rb)` |
//! | [`Sequential`] | `a.then(b)` | datum to `a`, `a.result()` to `b` | `rb` |
//! | [`Conditional`] | `a.when(b, pred)` | datum to the selected branch, resetting on switch | [`Branch`] |
//! | [`Routed`] | `a.route(b, pred)` | datum to the selected branch | `(ra, rb)` |
//! | [`Fanout`] | `Fanout::new((a, b, ..))` | datum to all N | `(ra, rb, ..)` |
//! | [`Mapped`] | `a.map_result(f)` | datum to `a` | `f(ra)` |
//!
//! # Example
//! ```
//! use monofold::{compose::ReducerExt, KbnSum, Max, Reducer, Welford};
//!
//! let mut r = KbnSum::new()
//!     .and(Welford::new())
//!     .and(Max::new())
//!     .map_result(|((sum, mean), max)| (sum, mean, max.unwrap_or(f64::NAN)));
//! r.update_all([1.0, 2.0, 6.0]);
//! assert_eq!(r.result(), (9.0, 3.0, 6.0));
//! ```

mod conditional;
mod parallel;
mod sequential;
mod variadic;

pub use conditional::{Branch, Conditional, Routed};
pub use parallel::Parallel;
pub use sequential::Sequential;
pub use variadic::Fanout;

use crate::algebra::Mapped;
use crate::reducer::Reducer;

/// Builder methods for composing reducers.
///
/// Blanket-implemented for every [`Reducer`].
pub trait ReducerExt: Reducer + Sized {
    /// Feed every datum to both `self` and `other`.
    fn and<B>(self, other: B) -> Parallel<Self, B>
    where
        Self::Input: Clone,
        B: Reducer<Input = Self::Input>,
    {
        Parallel::new(self, other)
    }

    /// Feed `self`'s running result into `next`.
    fn then<B>(self, next: B) -> Sequential<Self, B>
    where
        B: Reducer<Input = Self::Output>,
    {
        Sequential::new(self, next)
    }

    /// Use `self` while `predicate` holds and `otherwise` when it does not,
    /// discarding state on every switch.
    fn when<B, P>(self, otherwise: B, predicate: P) -> Conditional<Self, B, P>
    where
        B: Reducer<Input = Self::Input>,
        P: Fn(&Self::Input) -> bool + Clone,
    {
        Conditional::new(self, otherwise, predicate)
    }

    /// Split the stream by `predicate`, keeping both partitions.
    fn route<B, P>(self, otherwise: B, predicate: P) -> Routed<Self, B, P>
    where
        B: Reducer<Input = Self::Input>,
        P: Fn(&Self::Input) -> bool + Clone,
    {
        Routed::new(self, otherwise, predicate)
    }

    /// Transform the result with `f`.
    fn map_result<O, F>(self, f: F) -> Mapped<Self, F>
    where
        F: Fn(Self::Output) -> O + Clone,
    {
        Mapped::new(self, f)
    }
}

impl<R: Reducer> ReducerExt for R {}
