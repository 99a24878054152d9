//! The reducer contract.
//!
//! A [`Reducer`] is a stateful accumulator with four operations:
//!
//! - [`identity`](Reducer::identity) -- an empty reducer with the same
//!   configuration as `self`; a two-sided neutral element for `merge`.
//! - [`update`](Reducer::update) -- fold one datum in, O(1) regardless of history.
//! - [`merge`](Reducer::merge) -- combine with an independently accumulated
//!   reducer of the same type, as if `other`'s updates had been replayed on
//!   `self` in their original order.
//! - [`result`](Reducer::result) -- a pure, idempotent query.
//!
//! Reducers are plain values: they are copied with `Clone`, hold no shared
//! references, and carry no internal synchronization. Wrap them in
//! [`crate::sync`] types to share across threads.
//!
//! # Example
//! ```
//! use monofold::{Reducer, KbnSum};
//!
//! let mut left = KbnSum::default();
//! left.update(1.0).update(2.0);
//!
//! let mut right = left.identity();
//! right.update(3.0);
//!
//! left.merge(&right).unwrap();
//! assert_eq!(left.result(), 6.0);
//! ```

use crate::error::{MergeResult, TypeMismatchError};

pub trait Reducer: Clone {
    /// The datum consumed by `update`.
    type Input;
    /// The value produced by `result`.
    type Output;

    /// An empty reducer sharing this reducer's configuration.
    fn identity(&self) -> Self;

    /// Fold one datum into the state.
    fn update(&mut self, value: Self::Input) -> &mut Self;

    /// Fold another reducer's accumulated state into this one.
    ///
    /// Returns [`TypeMismatchError`] when the two configurations cannot be
    /// combined; in that case `self` is left unchanged.
    fn merge(&mut self, other: &Self) -> MergeResult;

    /// Extract the current result without touching the state.
    fn result(&self) -> Self::Output;

    /// Fold every value of an iterator, in order.
    fn update_all<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = Self::Input>,
    {
        for v in values {
            self.update(v);
        }
        self
    }

    /// By-value merge, convenient for folds over partial reducers.
    fn merged(mut self, other: &Self) -> Result<Self, TypeMismatchError> {
        self.merge(other)?;
        Ok(self)
    }
}

/// Fold `values` into a fresh identity of `prototype`.
pub fn fold<R, I>(prototype: &R, values: I) -> R
where
    R: Reducer,
    I: IntoIterator<Item = R::Input>,
{
    fold_from(prototype.identity(), values)
}

/// Fold `values` into `init`, returning the updated reducer.
pub fn fold_from<R, I>(mut init: R, values: I) -> R
where
    R: Reducer,
    I: IntoIterator<Item = R::Input>,
{
    init.update_all(values);
    init
}
