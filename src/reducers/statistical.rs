//! Statistical reducers: `Welford` (online mean/variance) and `Ema`

use crate::error::{ConfigurationError, MergeResult};
use crate::reducer::Reducer;
use crate::reducers::KbnSum;
use serde::{Deserialize, Serialize};

/* ===================== Welford ===================== */

/// Online mean and variance (Welford's algorithm).
///
/// Both the running mean and the sum of squared deviations (`M2`) are held in
/// [`KbnSum`]s. An update computes `delta = x - mean`, advances the mean by
/// `delta / n`, then takes `delta2 = x - mean` against the *new* mean and adds
/// `delta * delta2` to `M2`.
///
/// Merging uses the parallel-variance formula (Chan et al.):
///
/// ```text
/// n    = n1 + n2
/// mean = (n1 * mean1 + n2 * mean2) / n
/// M2   = M2_1 + M2_2 + delta^2 * n1 * n2 / n      (delta = mean2 - mean1)
/// ```
///
/// - Output: the mean (`0.0` when empty).
/// - Sample variance with fewer than two observations is `0.0`, not NaN.
///
/// # Example
/// ```
/// use monofold::{Reducer, Welford};
///
/// let mut w = Welford::new();
/// w.update_all([1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert!((w.mean() - 3.0).abs() < 1e-10);
/// assert!((w.variance() - 2.0).abs() < 1e-10);
/// assert!((w.sample_variance() - 2.5).abs() < 1e-10);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Welford {
    count: u64,
    mean: KbnSum,
    m2: KbnSum,
}

impl Welford {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: f64) -> Self {
        let mut w = Self::new();
        w.update(value);
        w
    }

    /// Rebuild from sufficient statistics `(count, mean, M2)`.
    #[must_use]
    pub const fn from_parts(count: u64, mean: f64, m2: f64) -> Self {
        Self {
            count,
            mean: KbnSum::from_value(mean),
            m2: KbnSum::from_value(m2),
        }
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean(&self) -> f64 {
        if self.count > 0 { self.mean.result() } else { 0.0 }
    }

    /// Population variance `M2 / n`.
    #[allow(clippy::cast_precision_loss)]
    pub fn variance(&self) -> f64 {
        if self.count > 0 {
            self.m2.result() / self.count as f64
        } else {
            0.0
        }
    }

    /// Sample variance `M2 / (n - 1)`; `0.0` when `n <= 1`.
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_variance(&self) -> f64 {
        if self.count > 1 {
            self.m2.result() / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn sample_std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }

    /// `mean * n`.
    #[allow(clippy::cast_precision_loss)]
    pub fn sum(&self) -> f64 {
        self.mean.result() * self.count as f64
    }

    /// The sum of squared deviations from the mean (`M2`).
    pub fn sum_of_squares(&self) -> f64 {
        self.m2.result()
    }
}

impl Reducer for Welford {
    type Input = f64;
    type Output = f64;

    fn identity(&self) -> Self {
        Self::new()
    }

    #[allow(clippy::cast_precision_loss)]
    fn update(&mut self, value: f64) -> &mut Self {
        self.count += 1;
        let delta = value - self.mean.result();
        self.mean.update(delta / self.count as f64);
        let delta2 = value - self.mean.result();
        self.m2.update(delta * delta2);
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn merge(&mut self, other: &Self) -> MergeResult {
        if other.count == 0 {
            return Ok(());
        }
        if self.count == 0 {
            *self = *other;
            return Ok(());
        }

        let n1 = self.count as f64;
        let n2 = other.count as f64;
        let n = n1 + n2;
        let mean1 = self.mean.result();
        let mean2 = other.mean.result();
        let delta = mean2 - mean1;

        self.mean.reset_to((n1 * mean1 + n2 * mean2) / n);
        self.m2.update(other.m2.result());
        self.m2.update(delta * delta * n1 * n2 / n);
        self.count += other.count;
        Ok(())
    }

    fn result(&self) -> f64 {
        self.mean()
    }
}

/* ===================== Ema ===================== */

/// Exponential moving average with an EMA of squared deviations.
///
/// ```text
/// first value:  ema = x, var = 0
/// afterwards:   delta = x - ema
///               ema  += alpha * delta
///               var   = (1 - alpha) * (var + alpha * delta^2)
/// ```
///
/// `alpha` must lie in `(0, 1]`; larger values weight recent data more.
///
/// The EMA is order-sensitive. `merge` is a count-weighted average of the
/// two EMAs and their variances, which is only an approximation of
/// replaying `other` after `self`. Do not shard an `Ema` across threads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ema {
    alpha: f64,
    ema: f64,
    variance: f64,
    count: u64,
}

impl Default for Ema {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            ema: 0.0,
            variance: 0.0,
            count: 0,
        }
    }
}

impl Ema {
    const COMPONENT: &'static str = "Ema";

    /// Build with smoothing factor `alpha` in `(0, 1]`.
    pub fn new(alpha: f64) -> Result<Self, ConfigurationError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigurationError::new(
                Self::COMPONENT,
                format!("alpha must lie in (0, 1], got {alpha}"),
            ));
        }
        Ok(Self {
            alpha,
            ..Self::default()
        })
    }

    /// `alpha = 2 / (period + 1)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_period(period: usize) -> Result<Self, ConfigurationError> {
        if period == 0 {
            return Err(ConfigurationError::new(Self::COMPONENT, "period must be > 0"));
        }
        Self::new(2.0 / (period as f64 + 1.0))
    }

    /// `alpha = 1 - exp(-ln 2 / half_life)`.
    pub fn from_half_life(half_life: f64) -> Result<Self, ConfigurationError> {
        if !(half_life > 0.0) {
            return Err(ConfigurationError::new(
                Self::COMPONENT,
                format!("half-life must be > 0, got {half_life}"),
            ));
        }
        Self::new(1.0 - (-std::f64::consts::LN_2 / half_life).exp())
    }

    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn mean(&self) -> f64 {
        self.ema
    }

    /// EMA of squared deviations (a volatility measure).
    pub const fn variance(&self) -> f64 {
        self.variance
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// `1 / alpha`, the effective window length of an infinite series.
    pub fn effective_samples(&self) -> f64 {
        1.0 / self.alpha
    }
}

impl Reducer for Ema {
    type Input = f64;
    type Output = f64;

    fn identity(&self) -> Self {
        Self {
            alpha: self.alpha,
            ..Self::default()
        }
    }

    fn update(&mut self, value: f64) -> &mut Self {
        self.count += 1;
        if self.count == 1 {
            self.ema = value;
            self.variance = 0.0;
        } else {
            let delta = value - self.ema;
            self.ema += self.alpha * delta;
            self.variance = (1.0 - self.alpha) * (self.variance + self.alpha * delta * delta);
        }
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn merge(&mut self, other: &Self) -> MergeResult {
        if other.count == 0 {
            return Ok(());
        }
        if self.count == 0 {
            let alpha = self.alpha;
            *self = *other;
            self.alpha = alpha;
            return Ok(());
        }
        let total = (self.count + other.count) as f64;
        let w1 = self.count as f64 / total;
        let w2 = other.count as f64 / total;
        self.ema = w1 * self.ema + w2 * other.ema;
        self.variance = w1 * self.variance + w2 * other.variance;
        self.count += other.count;
        Ok(())
    }

    fn result(&self) -> f64 {
        self.ema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welford_second_delta_uses_new_mean() {
        let mut w = Welford::new();
        w.update(2.0).update(4.0);
        // delta = 2, new mean = 3, delta2 = 1 -> M2 = 2
        assert_eq!(w.sum_of_squares(), 2.0);
        assert_eq!(w.sample_variance(), 2.0);
    }

    #[test]
    fn ema_alpha_validation() {
        assert!(Ema::new(0.0).is_err());
        assert!(Ema::new(1.5).is_err());
        assert!(Ema::new(f64::NAN).is_err());
        assert!(Ema::new(1.0).is_ok());
        assert!(Ema::from_period(0).is_err());
        assert!(Ema::from_half_life(-1.0).is_err());
    }
}
