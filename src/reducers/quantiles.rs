//! Streaming quantile estimators: P² markers and a reservoir sample

use crate::error::{ConfigurationError, MergeResult, TypeMismatchError, check_open_interval, check_positive};
use crate::reducer::Reducer;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

// ======================================================================
// P² (Jain & Chlamtac, 1985)
// ======================================================================

/// Single-quantile estimator in O(1) space.
///
/// Five markers track the minimum, the `p/2`, `p` and `(1+p)/2` quantiles,
/// and the maximum. Each update shifts marker positions and, when a marker
/// drifts at least one rank from its desired position, moves its height by
/// the piecewise-parabolic formula (falling back to linear interpolation when
/// the parabola would break monotonicity).
///
/// - Fewer than 5 observations: the raw values are kept and `result()` is the
///   nearest-rank `p` quantile over them.
/// - Empty: `result()` is NaN.
///
/// # Merge
///
/// Markers are not mergeable exactly. Two warmed-up estimators are combined
/// by a count-weighted average of the three interior marker heights, the
/// exact min/max for the outer markers, and positions recomputed from the
/// combined count. Expect errors of the same order as the estimator's own
/// (a few percent of the inter-quartile range on smooth data). When either
/// side still holds raw values those are replayed instead, which is exact
/// up to update order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct P2Quantile {
    p: f64,
    heights: [f64; 5],
    positions: [i64; 5],
    desired: [f64; 5],
    increments: [f64; 5],
    count: u64,
}

impl P2Quantile {
    const COMPONENT: &'static str = "P2Quantile";

    /// Estimator for quantile `p`, which must lie in `(0, 1)`.
    pub fn new(p: f64) -> Result<Self, ConfigurationError> {
        check_open_interval(Self::COMPONENT, "p", p, 0.0, 1.0)?;
        Ok(Self {
            p,
            heights: [0.0; 5],
            positions: [0, 1, 2, 3, 4],
            desired: Self::initial_desired(p),
            increments: [0.0, p / 2.0, p, (1.0 + p) / 2.0, 1.0],
            count: 0,
        })
    }

    /// Shorthand for `P2Quantile::new(0.5)`.
    pub fn median() -> Self {
        Self {
            p: 0.5,
            heights: [0.0; 5],
            positions: [0, 1, 2, 3, 4],
            desired: Self::initial_desired(0.5),
            increments: [0.0, 0.25, 0.5, 0.75, 1.0],
            count: 0,
        }
    }

    const fn initial_desired(p: f64) -> [f64; 5] {
        [0.0, 2.0 * p, 4.0 * p, 2.0 + 2.0 * p, 4.0]
    }

    pub const fn target_quantile(&self) -> f64 {
        self.p
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the five markers are initialized.
    pub const fn is_warm(&self) -> bool {
        self.count >= 5
    }

    /// Marker heights (min, p/2, p, (1+p)/2, max) once warm; raw observations
    /// (unsorted, zero-padded) before.
    pub const fn markers(&self) -> [f64; 5] {
        self.heights
    }

    #[allow(clippy::cast_possible_truncation)]
    fn raw(&self) -> &[f64] {
        &self.heights[..self.count.min(5) as usize]
    }

    #[allow(clippy::cast_precision_loss)]
    fn parabolic(&self, i: usize, d: i64) -> f64 {
        let (q, n) = (&self.heights, &self.positions);
        let d_f = d as f64;
        let span = (n[i + 1] - n[i - 1]) as f64;
        let right = (n[i] - n[i - 1] + d) as f64 * (q[i + 1] - q[i]) / (n[i + 1] - n[i]) as f64;
        let left = (n[i + 1] - n[i] - d) as f64 * (q[i] - q[i - 1]) / (n[i] - n[i - 1]) as f64;
        q[i] + d_f / span * (right + left)
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn linear(&self, i: usize, d: i64) -> f64 {
        let j = (i as i64 + d) as usize;
        self.heights[i]
            + d as f64 * (self.heights[j] - self.heights[i])
                / (self.positions[j] - self.positions[i]) as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn adjust_markers(&mut self) {
        for i in 1..4 {
            let d = self.desired[i] - self.positions[i] as f64;
            let gap_up = self.positions[i + 1] - self.positions[i];
            let gap_down = self.positions[i - 1] - self.positions[i];
            if (d >= 1.0 && gap_up > 1) || (d <= -1.0 && gap_down < -1) {
                let di = if d >= 0.0 { 1 } else { -1 };
                let mut q = self.parabolic(i, di);
                if q <= self.heights[i - 1] || q >= self.heights[i + 1] {
                    q = self.linear(i, di);
                }
                self.heights[i] = q;
                self.positions[i] += di;
            }
        }
    }

    /// Re-derive marker positions for `count` observations.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    fn realign_positions(&mut self) {
        let extra = (self.count - 5) as f64;
        let base = Self::initial_desired(self.p);
        for i in 0..5 {
            self.desired[i] = base[i] + extra * self.increments[i];
        }
        let last = self.count as i64 - 1;
        self.positions[0] = 0;
        self.positions[4] = last;
        for i in 1..4 {
            self.positions[i] = (self.desired[i].round() as i64).max(self.positions[i - 1] + 1);
        }
        for i in (1..4).rev() {
            self.positions[i] = self.positions[i].min(self.positions[i + 1] - 1);
        }
    }
}

impl Default for P2Quantile {
    fn default() -> Self {
        Self::median()
    }
}

impl Reducer for P2Quantile {
    type Input = f64;
    type Output = f64;

    fn identity(&self) -> Self {
        Self {
            p: self.p,
            heights: [0.0; 5],
            positions: [0, 1, 2, 3, 4],
            desired: Self::initial_desired(self.p),
            increments: self.increments,
            count: 0,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn update(&mut self, x: f64) -> &mut Self {
        self.count += 1;

        if self.count <= 5 {
            self.heights[(self.count - 1) as usize] = x;
            if self.count == 5 {
                self.heights.sort_unstable_by_key(|&v| OrderedFloat(v));
            }
            return self;
        }

        let q = &mut self.heights;
        let k = if x < q[0] {
            q[0] = x;
            0
        } else if x < q[1] {
            0
        } else if x < q[2] {
            1
        } else if x < q[3] {
            2
        } else if x < q[4] {
            3
        } else {
            q[4] = x;
            3
        };

        for pos in &mut self.positions[k + 1..] {
            *pos += 1;
        }
        for (want, inc) in self.desired.iter_mut().zip(&self.increments) {
            *want += inc;
        }
        self.adjust_markers();
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn merge(&mut self, other: &Self) -> MergeResult {
        if self.p != other.p {
            return Err(TypeMismatchError::new(
                Self::COMPONENT,
                format!("p = {}", self.p),
                format!("p = {}", other.p),
            ));
        }
        if other.count == 0 {
            return Ok(());
        }
        if !other.is_warm() {
            for &v in other.raw() {
                self.update(v);
            }
            return Ok(());
        }
        if !self.is_warm() {
            let mine = *self;
            *self = *other;
            for &v in mine.raw() {
                self.update(v);
            }
            return Ok(());
        }

        let total = (self.count + other.count) as f64;
        let w1 = self.count as f64 / total;
        let w2 = other.count as f64 / total;
        self.heights[0] = self.heights[0].min(other.heights[0]);
        self.heights[4] = self.heights[4].max(other.heights[4]);
        for i in 1..4 {
            self.heights[i] = w1 * self.heights[i] + w2 * other.heights[i];
        }
        self.count += other.count;
        self.realign_positions();
        Ok(())
    }

    /// The current estimate of the `p` quantile.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn result(&self) -> f64 {
        match self.count {
            0 => f64::NAN,
            n if n < 5 => {
                let mut sorted = [0.0; 5];
                let raw = self.raw();
                sorted[..raw.len()].copy_from_slice(raw);
                let sorted = &mut sorted[..raw.len()];
                sorted.sort_unstable_by_key(|&v| OrderedFloat(v));
                let rank = (self.p * n as f64).ceil() as usize;
                sorted[rank.clamp(1, raw.len()) - 1]
            }
            _ => self.heights[2],
        }
    }
}

// ======================================================================
// Reservoir sampling (Vitter's Algorithm R)
// ======================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(0xA24B_AED4_0B9C_497C),
        }
    }

    #[inline]
    const fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `(0, 1)`.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    fn next_open01(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
        let u = ((self.next_u64() >> 11) as f64) * SCALE;
        if u == 0.0 { f64::from_bits(1) } else { u }
    }

    /// Uniform in `0..bound` (`bound > 0`).
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: u64) -> u64 {
        ((u128::from(self.next_u64()) * u128::from(bound)) >> 64) as u64
    }
}

/// Quantiles from a uniform random sample of the stream.
///
/// Keeps up to `capacity` values chosen by Algorithm R: the `n`-th update
/// replaces a random slot with probability `capacity / n`. Quantiles are
/// read from the sorted sample with linear interpolation between neighbors.
///
/// The RNG is a seeded SplitMix64, so identical input with an identical seed
/// produces an identical sample.
///
/// # Merge
///
/// When both samples still hold their whole streams the values are simply
/// concatenated. Otherwise each retained value is weighted by the number of
/// observations it stands for (`count / sample_len` of its side) and
/// `capacity` values are drawn without replacement by weighted priority
/// keys `u^(1/w)` (Efraimidis–Spirakis).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReservoirQuantile {
    capacity: usize,
    seed: u64,
    rng: SplitMix64,
    sample: Vec<f64>,
    count: u64,
}

impl ReservoirQuantile {
    const COMPONENT: &'static str = "ReservoirQuantile";
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new(capacity: usize, seed: u64) -> Result<Self, ConfigurationError> {
        check_positive(Self::COMPONENT, "capacity", capacity)?;
        Ok(Self {
            capacity,
            seed,
            rng: SplitMix64::new(seed),
            sample: Vec::new(),
            count: 0,
        })
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of updates seen.
    pub const fn count(&self) -> u64 {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Values currently held.
    pub fn sample(&self) -> &[f64] {
        &self.sample
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.sample.clone();
        sorted.sort_unstable_by_key(|&v| OrderedFloat(v));
        sorted
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn interpolate(sorted: &[f64], p: f64) -> f64 {
        let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
            return f64::NAN;
        };
        if p <= 0.0 {
            return first;
        }
        if p >= 1.0 {
            return last;
        }
        let idx = p * (sorted.len() - 1) as f64;
        let lo = idx as usize;
        let hi = (lo + 1).min(sorted.len() - 1);
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }

    /// The `p` quantile of the sample; `p` is clamped to `[0, 1]`. NaN when empty.
    pub fn quantile(&self, p: f64) -> f64 {
        Self::interpolate(&self.sorted(), p)
    }

    /// Several quantiles from a single sort.
    pub fn quantiles(&self, ps: &[f64]) -> Vec<f64> {
        let sorted = self.sorted();
        ps.iter().map(|&p| Self::interpolate(&sorted, p)).collect()
    }

    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    pub fn q1(&self) -> f64 {
        self.quantile(0.25)
    }

    pub fn q3(&self) -> f64 {
        self.quantile(0.75)
    }

    pub fn iqr(&self) -> f64 {
        let qs = self.quantiles(&[0.25, 0.75]);
        qs[1] - qs[0]
    }

    /// Mean of the sampled values; NaN when empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        if self.sample.is_empty() {
            return f64::NAN;
        }
        self.sample.iter().sum::<f64>() / self.sample.len() as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn weighted_draw(&mut self, other: &Self) {
        let w_self = self.count as f64 / self.sample.len().max(1) as f64;
        let w_other = other.count as f64 / other.sample.len().max(1) as f64;

        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, usize)>> =
            BinaryHeap::with_capacity(self.capacity + 1);
        let candidates = self
            .sample
            .iter()
            .map(|&v| (v, w_self))
            .chain(other.sample.iter().map(|&v| (v, w_other)))
            .collect::<Vec<_>>();

        for (idx, &(_, w)) in candidates.iter().enumerate() {
            let key = self.rng.next_open01().powf(1.0 / w);
            heap.push(Reverse((OrderedFloat(key), idx)));
            if heap.len() > self.capacity {
                heap.pop();
            }
        }

        let mut keep: Vec<usize> = heap.into_iter().map(|Reverse((_, i))| i).collect();
        keep.sort_unstable();
        self.sample = keep.into_iter().map(|i| candidates[i].0).collect();
    }
}

impl Default for ReservoirQuantile {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            seed: 0,
            rng: SplitMix64::new(0),
            sample: Vec::new(),
            count: 0,
        }
    }
}

impl Reducer for ReservoirQuantile {
    type Input = f64;
    type Output = f64;

    fn identity(&self) -> Self {
        Self {
            capacity: self.capacity,
            seed: self.seed,
            rng: SplitMix64::new(self.seed),
            sample: Vec::new(),
            count: 0,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn update(&mut self, value: f64) -> &mut Self {
        self.count += 1;
        if self.sample.len() < self.capacity {
            self.sample.push(value);
        } else {
            let j = self.rng.below(self.count) as usize;
            if j < self.capacity {
                self.sample[j] = value;
            }
        }
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if self.capacity != other.capacity {
            return Err(TypeMismatchError::new(
                Self::COMPONENT,
                format!("capacity {}", self.capacity),
                format!("capacity {}", other.capacity),
            ));
        }
        if other.count == 0 {
            return Ok(());
        }
        if self.sample.len() + other.sample.len() <= self.capacity {
            self.sample.extend_from_slice(&other.sample);
        } else {
            self.weighted_draw(other);
        }
        self.count += other.count;
        Ok(())
    }

    /// The sample median.
    fn result(&self) -> f64 {
        self.median()
    }
}
