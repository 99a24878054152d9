//! Compensated (Kahan–Babuška–Neumaier) summation.

use crate::error::MergeResult;
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};

/// Running `f64` sum with a Neumaier correction term.
///
/// Each update forms the tentative sum `s + t`, where `t` is the incoming
/// value plus the carried correction, then recovers the low-order bits lost
/// by that addition. Which operand the lost bits are recovered from depends
/// on which has the larger magnitude:
///
/// ```text
/// |s| >= |t|:  c = (s - new) + t
/// |s| <  |t|:  c = (t - new) + s
/// ```
///
/// The result is `sum + correction`. The error stays within a small multiple
/// of machine epsilon independent of the number of terms, where naive
/// summation grows linearly.
///
/// # Merge precision
///
/// `merge` folds `other.result()` in as a single update. `other`'s own
/// correction is rounded into that one value instead of being carried
/// separately, so a merge can lose up to one ulp of `other`'s total.
///
/// # Example
/// ```
/// use monofold::{KbnSum, Reducer};
///
/// let mut s = KbnSum::default();
/// s.update_all([1e16, 1.0, 1.0, -1e16]);
/// assert!((s.result() - 2.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KbnSum {
    sum: f64,
    correction: f64,
}

impl KbnSum {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            correction: 0.0,
        }
    }

    /// A sum holding exactly one term.
    #[must_use]
    pub const fn from_value(value: f64) -> Self {
        Self {
            sum: value,
            correction: 0.0,
        }
    }

    /// Rebuild a sum from its sufficient statistics.
    #[must_use]
    pub const fn from_parts(sum: f64, correction: f64) -> Self {
        Self { sum, correction }
    }

    /// The uncorrected running sum.
    #[must_use]
    pub const fn sum_component(&self) -> f64 {
        self.sum
    }

    /// The accumulated rounding error not yet folded into `sum`.
    #[must_use]
    pub const fn correction_component(&self) -> f64 {
        self.correction
    }

    /// Replace the state with a single value.
    pub fn reset_to(&mut self, value: f64) {
        self.sum = value;
        self.correction = 0.0;
    }

    #[inline]
    fn add(&mut self, value: f64) {
        let term = value + self.correction;
        let new_sum = self.sum + term;
        self.correction = if self.sum.abs() >= term.abs() {
            (self.sum - new_sum) + term
        } else {
            (term - new_sum) + self.sum
        };
        self.sum = new_sum;
    }
}

impl Reducer for KbnSum {
    type Input = f64;
    type Output = f64;

    fn identity(&self) -> Self {
        Self::new()
    }

    #[inline]
    fn update(&mut self, value: f64) -> &mut Self {
        self.add(value);
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        self.add(other.result());
        Ok(())
    }

    #[inline]
    fn result(&self) -> f64 {
        self.sum + self.correction
    }
}

impl From<f64> for KbnSum {
    fn from(value: f64) -> Self {
        Self::from_value(value)
    }
}
