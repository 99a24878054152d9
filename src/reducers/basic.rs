//! Basic reducers: Sum, Count, Min, Max, MinMax, Product

use crate::error::MergeResult;
use crate::reducer::Reducer;
use crate::reducers::KbnSum;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::mem::take;
use std::ops::Add;

/* ===================== Sum<T> ===================== */

/// Plain (uncompensated) sum.
///
/// - State: `T`
/// - Output: `T`
///
/// Requires `T: Add<Output=T> + Default`. For floating-point data prefer
/// [`KbnSum`], which keeps the rounding error bounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sum<T> {
    total: T,
}

impl<T: Default> Sum<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub fn new() -> Self {
        Self { total: T::default() }
    }
}

impl<T> Sum<T> {
    pub const fn from_value(total: T) -> Self {
        Self { total }
    }
}

impl<T> Reducer for Sum<T>
where
    T: Clone + Default + Add<Output = T>,
{
    type Input = T;
    type Output = T;

    fn identity(&self) -> Self {
        Self { total: T::default() }
    }

    fn update(&mut self, value: T) -> &mut Self {
        self.total = take(&mut self.total) + value;
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        self.total = take(&mut self.total) + other.total.clone();
        Ok(())
    }

    fn result(&self) -> T {
        self.total.clone()
    }
}

/* ===================== Count<T> ===================== */

/// Number of updates, regardless of their value.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Count<T> {
    count: u64,
    _m: PhantomData<fn(T)>,
}

impl<T> Count<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0, _m: PhantomData }
    }

    #[must_use]
    pub const fn from_count(count: u64) -> Self {
        Self { count, _m: PhantomData }
    }
}

impl<T> Default for Count<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls: derive would demand `T: Clone` / `T: Debug`.
impl<T> std::fmt::Debug for Count<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Count").field("count", &self.count).finish()
    }
}
impl<T> Clone for Count<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Count<T> {}

impl<T> Reducer for Count<T> {
    type Input = T;
    type Output = u64;

    fn identity(&self) -> Self {
        Self::new()
    }

    fn update(&mut self, _value: T) -> &mut Self {
        self.count += 1;
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        self.count += other.count;
        Ok(())
    }

    fn result(&self) -> u64 {
        self.count
    }
}

/* ===================== Min<T> ===================== */

/// Minimum value seen (requires `PartialOrd`).
///
/// - State: `Option<T>`
/// - Output: `Option<T>`; `None` until the first update.
///
/// Incomparable values (NaN) never replace an existing minimum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Min<T> {
    value: Option<T>,
}

impl<T> Min<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    pub const fn from_value(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub const fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

impl<T> Reducer for Min<T>
where
    T: Clone + PartialOrd,
{
    type Input = T;
    type Output = Option<T>;

    fn identity(&self) -> Self {
        Self::new()
    }

    fn update(&mut self, v: T) -> &mut Self {
        match &mut self.value {
            Some(cur) => {
                if v < *cur {
                    *cur = v;
                }
            }
            None => self.value = Some(v),
        }
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if let Some(b) = &other.value {
            self.update(b.clone());
        }
        Ok(())
    }

    fn result(&self) -> Option<T> {
        self.value.clone()
    }
}

/* ===================== Max<T> ===================== */

/// Maximum value seen (requires `PartialOrd`).
///
/// - State: `Option<T>`
/// - Output: `Option<T>`; `None` until the first update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Max<T> {
    value: Option<T>,
}

impl<T> Max<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    pub const fn from_value(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub const fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

impl<T> Reducer for Max<T>
where
    T: Clone + PartialOrd,
{
    type Input = T;
    type Output = Option<T>;

    fn identity(&self) -> Self {
        Self::new()
    }

    fn update(&mut self, v: T) -> &mut Self {
        match &mut self.value {
            Some(cur) => {
                if v > *cur {
                    *cur = v;
                }
            }
            None => self.value = Some(v),
        }
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if let Some(b) = &other.value {
            self.update(b.clone());
        }
        Ok(())
    }

    fn result(&self) -> Option<T> {
        self.value.clone()
    }
}

/* ===================== MinMax<T> ===================== */

/// Minimum and maximum tracked together in one state.
///
/// Cheaper than `Min<T>` composed in parallel with `Max<T>`: one comparison
/// pass and one `Option`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax<T> {
    bounds: Option<(T, T)>,
}

impl<T> MinMax<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { bounds: None }
    }

    pub const fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }
}

impl<T: Clone + PartialOrd> MinMax<T> {
    pub fn from_value(value: T) -> Self {
        Self {
            bounds: Some((value.clone(), value)),
        }
    }

    pub fn min(&self) -> Option<T> {
        self.bounds.as_ref().map(|(lo, _)| lo.clone())
    }

    pub fn max(&self) -> Option<T> {
        self.bounds.as_ref().map(|(_, hi)| hi.clone())
    }
}

impl MinMax<f64> {
    /// `max - min`, or `0.0` when empty.
    pub fn range(&self) -> f64 {
        self.bounds.map_or(0.0, |(lo, hi)| hi - lo)
    }
}

impl<T> Reducer for MinMax<T>
where
    T: Clone + PartialOrd,
{
    type Input = T;
    type Output = Option<(T, T)>;

    fn identity(&self) -> Self {
        Self::new()
    }

    fn update(&mut self, v: T) -> &mut Self {
        match &mut self.bounds {
            Some((lo, hi)) => {
                if v < *lo {
                    *lo = v;
                } else if v > *hi {
                    *hi = v;
                }
            }
            None => self.bounds = Some((v.clone(), v)),
        }
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if let Some((lo, hi)) = &other.bounds {
            self.update(lo.clone());
            self.update(hi.clone());
        }
        Ok(())
    }

    fn result(&self) -> Option<(T, T)> {
        self.bounds.clone()
    }
}

/* ===================== Product ===================== */

/// Product of `f64` values, accumulated in the log domain.
///
/// Summing `ln|x|` (with compensation) instead of multiplying keeps long
/// products from overflowing or underflowing mid-stream. A zero factor is
/// remembered separately and the sign is tracked by parity of negative
/// factors. The empty product is `1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    log_magnitude: KbnSum,
    negatives: u64,
    factors: u64,
    has_zero: bool,
}

impl Product {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: f64) -> Self {
        let mut p = Self::new();
        p.update(value);
        p
    }

    pub const fn is_empty(&self) -> bool {
        self.factors == 0
    }

    /// Sum of `ln|x|` over every non-zero factor.
    pub fn log_magnitude(&self) -> f64 {
        self.log_magnitude.result()
    }
}

impl Reducer for Product {
    type Input = f64;
    type Output = f64;

    fn identity(&self) -> Self {
        Self::new()
    }

    fn update(&mut self, value: f64) -> &mut Self {
        self.factors += 1;
        if value == 0.0 {
            self.has_zero = true;
        } else {
            if value.is_sign_negative() {
                self.negatives += 1;
            }
            self.log_magnitude.update(value.abs().ln());
        }
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        self.log_magnitude.merge(&other.log_magnitude)?;
        self.negatives += other.negatives;
        self.factors += other.factors;
        self.has_zero |= other.has_zero;
        Ok(())
    }

    fn result(&self) -> f64 {
        if self.has_zero {
            return 0.0;
        }
        if self.factors == 0 {
            return 1.0;
        }
        let magnitude = self.log_magnitude.result().exp();
        if self.negatives % 2 == 1 { -magnitude } else { magnitude }
    }
}
