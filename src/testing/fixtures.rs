//! Numeric datasets that defeat naive accumulation.

const TWO_POW_53: f64 = 9_007_199_254_740_992.0;

/// Values whose exact sum is `2.0`, but a plain left-to-right `f64` sum
/// returns `0.0`: both ones round away against `2^53`.
///
/// # Example
///
/// ```
/// use monofold::{KbnSum, Reducer, fold};
/// use monofold::testing::ill_conditioned_sum;
///
/// let data = ill_conditioned_sum();
/// assert_eq!(data.iter().sum::<f64>(), 0.0);
/// assert_eq!(fold(&KbnSum::new(), data).result(), 2.0);
/// ```
#[must_use]
pub fn ill_conditioned_sum() -> Vec<f64> {
    vec![TWO_POW_53, 1.0, 1.0, -TWO_POW_53]
}

/// `n` copies of `0.1`, whose exact decimal sum is `n / 10`.
#[must_use]
pub fn repeated_tenths(n: usize) -> Vec<f64> {
    vec![0.1; n]
}

/// Alternating `+big, small, -big` triples; the exact sum is
/// `small * triples`.
///
/// # Example
///
/// ```
/// use monofold::testing::alternating_magnitudes;
///
/// let data = alternating_magnitudes(100, 1e15, 0.25);
/// assert_eq!(data.len(), 300);
/// ```
#[must_use]
pub fn alternating_magnitudes(triples: usize, big: f64, small: f64) -> Vec<f64> {
    (0..triples).flat_map(|_| [big, small, -big]).collect()
}

/// Shards of very different sizes and locations, for merge tests.
///
/// Shard `i` holds `10^i` values centred on `1e6 * i`, plus one empty
/// shard at the end. The concatenation has a mean far from every
/// individual shard's mean.
#[must_use]
pub fn skewed_shards() -> Vec<Vec<f64>> {
    let mut shards: Vec<Vec<f64>> = (0..4_u32)
        .map(|i| {
            let len = 10_usize.pow(i);
            let centre = 1e6 * f64::from(i);
            (0..len)
                .map(|j| {
                    #[allow(clippy::cast_precision_loss)]
                    let offset = (j % 7) as f64 - 3.0;
                    centre + offset
                })
                .collect()
        })
        .collect();
    shards.push(Vec::new());
    shards
}

/// A large constant offset plus a small spread; the population variance
/// is `2/3` when `n` is a multiple of three. Naive sum-of-squares variance loses every digit.
#[must_use]
pub fn offset_variance_data(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let spread = (i % 3) as f64 - 1.0;
            1e9 + spread
        })
        .collect()
}

/// Numeric data with two outliers.
#[must_use]
pub fn numeric_data_with_outliers() -> Vec<f64> {
    vec![
        1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, //
        150.0, //
        11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0, 20.0, //
        -50.0,
    ]
}
