//! Online covariance, correlation and simple linear regression.

use crate::error::MergeResult;
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};

/// Streaming covariance over `(x, y)` pairs.
///
/// Tracks the count, both means, the per-axis sums of squared deviations and
/// the co-moment `C_xy` with the bivariate form of Welford's update:
///
/// ```text
/// dx = x - mean_x
/// mean_x += dx / n;  mean_y += (y - mean_y) / n
/// C_xy  += dx * (y - mean_y)        // new mean_y
/// ```
///
/// Merging applies the pairwise-moment formula
/// `C = C1 + C2 + dx * dy * n1 * n2 / n`.
///
/// `result()` returns the population covariance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Covariance {
    count: u64,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    c_xy: f64,
}

impl Covariance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(x: f64, y: f64) -> Self {
        let mut c = Self::new();
        c.update((x, y));
        c
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn mean_x(&self) -> f64 {
        self.mean_x
    }

    pub const fn mean_y(&self) -> f64 {
        self.mean_y
    }

    /// Population covariance `C_xy / n`.
    #[allow(clippy::cast_precision_loss)]
    pub fn covariance(&self) -> f64 {
        if self.count > 0 {
            self.c_xy / self.count as f64
        } else {
            0.0
        }
    }

    /// Sample covariance `C_xy / (n - 1)`; `0.0` when `n <= 1`.
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_covariance(&self) -> f64 {
        if self.count > 1 {
            self.c_xy / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn variance_x(&self) -> f64 {
        if self.count > 0 {
            self.m2_x / self.count as f64
        } else {
            0.0
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn variance_y(&self) -> f64 {
        if self.count > 0 {
            self.m2_y / self.count as f64
        } else {
            0.0
        }
    }

    pub fn std_dev_x(&self) -> f64 {
        self.variance_x().sqrt()
    }

    pub fn std_dev_y(&self) -> f64 {
        self.variance_y().sqrt()
    }

    /// Pearson correlation coefficient.
    ///
    /// `0.0` with fewer than two observations or when either axis is constant.
    pub fn correlation(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let sx = self.std_dev_x();
        let sy = self.std_dev_y();
        if sx == 0.0 || sy == 0.0 {
            return 0.0;
        }
        self.covariance() / (sx * sy)
    }

    /// Least-squares slope of `y` on `x`; `0.0` when `x` is constant.
    pub fn slope(&self) -> f64 {
        let vx = self.variance_x();
        if vx == 0.0 { 0.0 } else { self.covariance() / vx }
    }

    pub fn intercept(&self) -> f64 {
        self.mean_y - self.slope() * self.mean_x
    }

    /// Coefficient of determination of the least-squares fit.
    pub fn r_squared(&self) -> f64 {
        let r = self.correlation();
        r * r
    }
}

impl Reducer for Covariance {
    type Input = (f64, f64);
    type Output = f64;

    fn identity(&self) -> Self {
        Self::new()
    }

    #[allow(clippy::cast_precision_loss)]
    fn update(&mut self, (x, y): (f64, f64)) -> &mut Self {
        self.count += 1;
        let n = self.count as f64;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        let dx2 = x - self.mean_x;
        let dy2 = y - self.mean_y;
        self.m2_x += dx * dx2;
        self.m2_y += dy * dy2;
        self.c_xy += dx * dy2;
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
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let w = n1 * n2 / n;

        self.m2_x += other.m2_x + dx * dx * w;
        self.m2_y += other.m2_y + dy * dy * w;
        self.c_xy += other.c_xy + dx * dy * w;
        self.mean_x = (n1 * self.mean_x + n2 * other.mean_x) / n;
        self.mean_y = (n1 * self.mean_y + n2 * other.mean_y) / n;
        self.count += other.count;
        Ok(())
    }

    fn result(&self) -> f64 {
        self.covariance()
    }
}
