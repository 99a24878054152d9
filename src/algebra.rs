//! Algebraic structure of reducers.
//!
//! Reducers under `merge` form a monoid: `identity()` is neutral on both
//! sides and `merge` is associative. A fold over a stream is then a monoid
//! homomorphism from sequences under concatenation to reducer states, which
//! is what makes splitting work across threads or partitions sound.
//!
//! This module provides:
//!
//! - [`Mapped`]: the functor map over a reducer's result.
//! - [`Pure`]: a constant reducer that ignores its input.
//! - [`ApproxEq`] and the law checkers in [`laws`], used by the crate's tests
//!   and available to callers validating their own reducers.

use crate::compose::Branch;
use crate::error::MergeResult;
use crate::reducer::Reducer;
use std::marker::PhantomData;

/* ===================== Mapped ===================== */

/// A reducer whose result is passed through `f`.
///
/// Update and merge go straight to the inner reducer, so `Mapped` is a
/// monoid whenever the inner reducer is.
#[derive(Clone)]
pub struct Mapped<R, F> {
    inner: R,
    f: F,
}

impl<R, F> Mapped<R, F> {
    pub const fn new(inner: R, f: F) -> Self {
        Self { inner, f }
    }

    /// The wrapped reducer.
    pub const fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: std::fmt::Debug, F> std::fmt::Debug for Mapped<R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapped")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<R, F, O> Reducer for Mapped<R, F>
where
    R: Reducer,
    F: Fn(R::Output) -> O + Clone,
{
    type Input = R::Input;
    type Output = O;

    fn identity(&self) -> Self {
        Self::new(self.inner.identity(), self.f.clone())
    }

    fn update(&mut self, value: R::Input) -> &mut Self {
        self.inner.update(value);
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        self.inner.merge(&other.inner)
    }

    fn result(&self) -> O {
        (self.f)(self.inner.result())
    }
}

/// `Mapped::new(reducer, f)` as a free function.
pub fn fmap<R, F, O>(f: F, reducer: R) -> Mapped<R, F>
where
    R: Reducer,
    F: Fn(R::Output) -> O + Clone,
{
    Mapped::new(reducer, f)
}

/* ===================== Pure ===================== */

/// A reducer that always yields the same value.
///
/// Updates and merges are no-ops; every instance is its own identity.
pub struct Pure<I, O> {
    value: O,
    _m: PhantomData<fn(I)>,
}

impl<I, O> Pure<I, O> {
    pub const fn new(value: O) -> Self {
        Self {
            value,
            _m: PhantomData,
        }
    }
}

impl<I, O: Clone> Clone for Pure<I, O> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<I, O: std::fmt::Debug> std::fmt::Debug for Pure<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pure").field(&self.value).finish()
    }
}

impl<I, O: Clone> Reducer for Pure<I, O> {
    type Input = I;
    type Output = O;

    fn identity(&self) -> Self {
        self.clone()
    }

    fn update(&mut self, _value: I) -> &mut Self {
        self
    }

    fn merge(&mut self, _other: &Self) -> MergeResult {
        Ok(())
    }

    fn result(&self) -> O {
        self.value.clone()
    }
}

pub const fn pure<I, O>(value: O) -> Pure<I, O> {
    Pure::new(value)
}

/* ===================== ApproxEq ===================== */

/// Equality up to a floating-point tolerance.
///
/// Floats compare with a mixed absolute/relative bound:
/// `|a - b| <= tol * max(1, |a|, |b|)`. Two NaNs are equal, and infinities
/// equal only themselves. Integers and other exact types ignore `tol`.
pub trait ApproxEq {
    fn approx_eq(&self, other: &Self, tol: f64) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        if self.is_nan() || other.is_nan() {
            return self.is_nan() && other.is_nan();
        }
        if self.is_infinite() || other.is_infinite() {
            return self == other;
        }
        let scale = 1.0_f64.max(self.abs()).max(other.abs());
        (self - other).abs() <= tol * scale
    }
}

impl ApproxEq for f32 {
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        f64::from(*self).approx_eq(&f64::from(*other), tol)
    }
}

macro_rules! exact_approx_eq {
    ($($t:ty),*) => {
        $(impl ApproxEq for $t {
            fn approx_eq(&self, other: &Self, _tol: f64) -> bool {
                self == other
            }
        })*
    };
}

exact_approx_eq!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, String);

impl<T: ApproxEq> ApproxEq for Option<T> {
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.approx_eq(b, tol),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ApproxEq> ApproxEq for Vec<T> {
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.approx_eq(b, tol))
    }
}

impl<L: ApproxEq, R: ApproxEq> ApproxEq for Branch<L, R> {
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        match (self, other) {
            (Branch::First(a), Branch::First(b)) => a.approx_eq(b, tol),
            (Branch::Second(a), Branch::Second(b)) => a.approx_eq(b, tol),
            _ => false,
        }
    }
}

macro_rules! tuple_approx_eq {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: ApproxEq),+> ApproxEq for ($($name,)+) {
            fn approx_eq(&self, other: &Self, tol: f64) -> bool {
                true $(&& self.$idx.approx_eq(&other.$idx, tol))+
            }
        }
    };
}

tuple_approx_eq!(A: 0);
tuple_approx_eq!(A: 0, B: 1);
tuple_approx_eq!(A: 0, B: 1, C: 2);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10);
tuple_approx_eq!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10, L: 11);

/* ===================== Laws ===================== */

/// Monoid and homomorphism law checks.
///
/// Each check compares `result()`s with [`ApproxEq`] at tolerance `tol` and
/// returns `Ok(false)` on a violation. Merge errors are propagated.
pub mod laws {
    use super::ApproxEq;
    use crate::error::TypeMismatchError;
    use crate::reducer::{Reducer, fold};

    /// `identity ⊕ r == r`.
    pub fn left_identity<R>(r: &R, tol: f64) -> Result<bool, TypeMismatchError>
    where
        R: Reducer,
        R::Output: ApproxEq,
    {
        let merged = r.identity().merged(r)?;
        Ok(merged.result().approx_eq(&r.result(), tol))
    }

    /// `r ⊕ identity == r`.
    pub fn right_identity<R>(r: &R, tol: f64) -> Result<bool, TypeMismatchError>
    where
        R: Reducer,
        R::Output: ApproxEq,
    {
        let merged = r.clone().merged(&r.identity())?;
        Ok(merged.result().approx_eq(&r.result(), tol))
    }

    /// `(a ⊕ b) ⊕ c == a ⊕ (b ⊕ c)`.
    pub fn associativity<R>(a: &R, b: &R, c: &R, tol: f64) -> Result<bool, TypeMismatchError>
    where
        R: Reducer,
        R::Output: ApproxEq,
    {
        let left = a.clone().merged(b)?.merged(c)?;
        let right = a.clone().merged(&b.clone().merged(c)?)?;
        Ok(left.result().approx_eq(&right.result(), tol))
    }

    /// `fold(xs ++ ys) == fold(xs) ⊕ fold(ys)` for the split of `values` at `at`.
    ///
    /// `at` is clamped to `values.len()`.
    pub fn split_homomorphism<R>(
        prototype: &R,
        values: &[R::Input],
        at: usize,
        tol: f64,
    ) -> Result<bool, TypeMismatchError>
    where
        R: Reducer,
        R::Input: Clone,
        R::Output: ApproxEq,
    {
        let (xs, ys) = values.split_at(at.min(values.len()));
        let whole = fold(prototype, values.iter().cloned());
        let left = fold(prototype, xs.iter().cloned());
        let right = fold(prototype, ys.iter().cloned());
        let merged = left.merged(&right)?;
        Ok(merged.result().approx_eq(&whole.result(), tol))
    }

    /// Both identity laws at once.
    pub fn identity<R>(r: &R, tol: f64) -> Result<bool, TypeMismatchError>
    where
        R: Reducer,
        R::Output: ApproxEq,
    {
        Ok(left_identity(r, tol)? && right_identity(r, tol)?)
    }
}
