//! Fixed-bin histogram.

use crate::error::{ConfigurationError, MergeResult, TypeMismatchError};
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};

/// Equal-width bins over `[min, max)` with out-of-range counters.
///
/// - Values below `min` go to the underflow counter, values at or above `max`
///   to the overflow counter, NaN to a separate NaN counter.
/// - `total()` counts every non-NaN update, including under/overflow.
/// - Two histograms only merge when their `(min, max, bins)` are identical;
///   otherwise `merge` returns [`TypeMismatchError`].
///
/// `result()` is the bin-center estimate of the mean of in-range values.
///
/// # Example
/// ```
/// use monofold::{Histogram, Reducer};
///
/// let mut h = Histogram::new(0.0, 10.0, 10)?;
/// h.update_all([0.5, 1.5, 1.7, 12.0, -3.0]);
/// assert_eq!(h.bin_count(1), 2);
/// assert_eq!(h.underflow(), 1);
/// assert_eq!(h.overflow(), 1);
/// assert_eq!(h.total(), 5);
/// # Ok::<(), monofold::ConfigurationError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramParts")]
pub struct Histogram {
    min: f64,
    max: f64,
    width: f64,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
    nan: u64,
    total: u64,
}

/// Serialized layout of [`Histogram`], checked before use.
#[derive(Deserialize)]
struct HistogramParts {
    min: f64,
    max: f64,
    #[allow(dead_code)]
    width: f64,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
    nan: u64,
    total: u64,
}

impl TryFrom<HistogramParts> for Histogram {
    type Error = ConfigurationError;

    fn try_from(parts: HistogramParts) -> Result<Self, Self::Error> {
        let mut h = Self::new(parts.min, parts.max, parts.counts.len())?;
        let binned = parts.counts.iter().try_fold(0u64, |acc, c| acc.checked_add(*c));
        let expected = binned
            .and_then(|b| b.checked_add(parts.underflow))
            .and_then(|b| b.checked_add(parts.overflow));
        if expected != Some(parts.total) {
            return Err(ConfigurationError::new(
                Self::COMPONENT,
                format!(
                    "total {} does not match bin, underflow and overflow counts",
                    parts.total
                ),
            ));
        }
        h.counts = parts.counts;
        h.underflow = parts.underflow;
        h.overflow = parts.overflow;
        h.nan = parts.nan;
        h.total = parts.total;
        Ok(h)
    }
}

impl Default for Histogram {
    /// 100 bins over `[0, 1)`.
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            width: 0.01,
            counts: vec![0; 100],
            underflow: 0,
            overflow: 0,
            nan: 0,
            total: 0,
        }
    }
}

impl Histogram {
    const COMPONENT: &'static str = "Histogram";

    /// `bins` equal-width bins over `[min, max)`.
    ///
    /// Fails when `min >= max`, either bound is not finite, or `bins == 0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(min: f64, max: f64, bins: usize) -> Result<Self, ConfigurationError> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(ConfigurationError::new(
                Self::COMPONENT,
                format!("bounds must be finite, got [{min}, {max})"),
            ));
        }
        if min >= max {
            return Err(ConfigurationError::new(
                Self::COMPONENT,
                format!("min must be less than max, got [{min}, {max})"),
            ));
        }
        if bins == 0 {
            return Err(ConfigurationError::new(
                Self::COMPONENT,
                "must have at least 1 bin",
            ));
        }
        Ok(Self {
            min,
            max,
            width: (max - min) / bins as f64,
            counts: vec![0; bins],
            underflow: 0,
            overflow: 0,
            nan: 0,
            total: 0,
        })
    }

    pub const fn min(&self) -> f64 {
        self.min
    }

    pub const fn max(&self) -> f64 {
        self.max
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub const fn bin_width(&self) -> f64 {
        self.width
    }

    /// All in-range bin counts, left to right.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Count of bin `bin`; `0` when out of range.
    pub fn bin_count(&self, bin: usize) -> u64 {
        self.counts.get(bin).copied().unwrap_or(0)
    }

    pub const fn underflow(&self) -> u64 {
        self.underflow
    }

    pub const fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Number of NaN updates (not included in `total`).
    pub const fn nan_count(&self) -> u64 {
        self.nan
    }

    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Values that landed in a bin.
    pub const fn in_range(&self) -> u64 {
        self.total - self.underflow - self.overflow
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn bin_left(&self, bin: usize) -> f64 {
        self.min + bin as f64 * self.width
    }

    pub fn bin_right(&self, bin: usize) -> f64 {
        self.bin_left(bin) + self.width
    }

    pub fn bin_center(&self, bin: usize) -> f64 {
        self.bin_left(bin) + self.width / 2.0
    }

    /// Index of the bin holding `value`, or `None` outside `[min, max)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bin_for(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value < self.min || value >= self.max {
            return None;
        }
        let idx = ((value - self.min) / self.width) as usize;
        Some(idx.min(self.counts.len() - 1))
    }

    /// `count / (total * width)`; `0.0` when empty or `bin` is out of range.
    #[allow(clippy::cast_precision_loss)]
    pub fn density(&self, bin: usize) -> f64 {
        if self.total == 0 || bin >= self.counts.len() {
            return 0.0;
        }
        self.counts[bin] as f64 / (self.total as f64 * self.width)
    }

    /// `count / total`; `0.0` when empty or `bin` is out of range.
    #[allow(clippy::cast_precision_loss)]
    pub fn frequency(&self, bin: usize) -> f64 {
        if self.total == 0 || bin >= self.counts.len() {
            return 0.0;
        }
        self.counts[bin] as f64 / self.total as f64
    }

    /// Underflow plus every bin up to and including `bin`.
    pub fn cumulative_count(&self, bin: usize) -> u64 {
        let end = bin.saturating_add(1).min(self.counts.len());
        self.underflow + self.counts[..end].iter().sum::<u64>()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn cdf(&self, bin: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.cumulative_count(bin) as f64 / self.total as f64
        }
    }

    /// Quantile estimate with linear interpolation inside the target bin.
    ///
    /// Returns `min` when empty or `p` lies outside `[0, 1]`, and `max` when
    /// the target rank falls in the overflow.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn quantile(&self, p: f64) -> f64 {
        if self.total == 0 || !(0.0..=1.0).contains(&p) {
            return self.min;
        }
        let target = (p * self.total as f64) as u64;
        let mut cumulative = self.underflow;
        for (i, &c) in self.counts.iter().enumerate() {
            if cumulative + c >= target {
                let frac = if c > 0 {
                    target.saturating_sub(cumulative) as f64 / c as f64
                } else {
                    0.0
                };
                return self.bin_left(i) + frac * self.width;
            }
            cumulative += c;
        }
        self.max
    }

    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Mean of in-range values, each taken at its bin center; `0.0` when no
    /// value landed in a bin.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        let in_range = self.in_range();
        if in_range == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, &c)| self.bin_center(i) * c as f64)
            .sum();
        weighted / in_range as f64
    }

    fn describe(&self) -> String {
        format!("[{}, {}) x {}", self.min, self.max, self.counts.len())
    }

    fn same_bins(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max && self.counts.len() == other.counts.len()
    }
}

impl Reducer for Histogram {
    type Input = f64;
    type Output = f64;

    fn identity(&self) -> Self {
        Self {
            counts: vec![0; self.counts.len()],
            underflow: 0,
            overflow: 0,
            nan: 0,
            total: 0,
            ..*self
        }
    }

    fn update(&mut self, value: f64) -> &mut Self {
        if value.is_nan() {
            self.nan += 1;
            return self;
        }
        self.total += 1;
        match self.bin_for(value) {
            Some(bin) => self.counts[bin] += 1,
            None if value < self.min => self.underflow += 1,
            None => self.overflow += 1,
        }
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if !self.same_bins(other) {
            return Err(TypeMismatchError::new(
                Self::COMPONENT,
                self.describe(),
                other.describe(),
            ));
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.nan += other.nan;
        self.total += other.total;
        Ok(())
    }

    fn result(&self) -> f64 {
        self.mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_bounds() {
        assert!(Histogram::new(1.0, 1.0, 4).is_err());
        assert!(Histogram::new(2.0, 1.0, 4).is_err());
        assert!(Histogram::new(0.0, 1.0, 0).is_err());
        assert!(Histogram::new(f64::NAN, 1.0, 4).is_err());
        assert!(Histogram::new(0.0, f64::INFINITY, 4).is_err());
    }

    #[test]
    fn upper_edge_overflows() {
        let mut h = Histogram::new(0.0, 1.0, 4).unwrap();
        h.update(1.0).update(f64::NAN).update(0.999_999);
        assert_eq!(h.overflow(), 1);
        assert_eq!(h.nan_count(), 1);
        assert_eq!(h.bin_count(3), 1);
        assert_eq!(h.total(), 2);
    }
}
