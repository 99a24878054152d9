//! Test data builders for input streams.

use std::ops::RangeInclusive;

/// A fluent builder for reducer input.
///
/// # Example
///
/// ```
/// use monofold::testing::TestDataBuilder;
///
/// let data = TestDataBuilder::new()
///     .add_range(1..=10)
///     .add_value(100.0)
///     .add_repeated(0.5, 5)
///     .build();
///
/// assert_eq!(data.len(), 16);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TestDataBuilder<T> {
    data: Vec<T>,
}

impl<T> TestDataBuilder<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[must_use]
    pub fn add_value(mut self, value: T) -> Self {
        self.data.push(value);
        self
    }

    #[must_use]
    pub fn add_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.data.extend(values);
        self
    }

    #[must_use]
    pub fn add_repeated(mut self, value: T, count: usize) -> Self
    where
        T: Clone,
    {
        self.data.extend(std::iter::repeat_n(value, count));
        self
    }

    /// Append `f(i)` for `i` in `0..count`.
    #[must_use]
    pub fn add_generated(mut self, count: usize, f: impl FnMut(usize) -> T) -> Self {
        self.data.extend((0..count).map(f));
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: From<i32>> TestDataBuilder<T> {
    /// Append every integer in `range`, converted to `T`.
    #[must_use]
    pub fn add_range(mut self, range: RangeInclusive<i32>) -> Self {
        self.data.extend(range.map(T::from));
        self
    }
}

impl TestDataBuilder<f64> {
    /// Append `count` deterministic pseudo-random values in `[min, max)`.
    #[must_use]
    pub fn add_uniform(self, count: usize, min: f64, max: f64, seed: u64) -> Self {
        self.add_values(uniform_data(count, min, max, seed))
    }
}

/// `count` reproducible pseudo-random values in `[min, max)`.
///
/// Uses a SplitMix64 stream, so the same seed always yields the same data.
///
/// # Example
///
/// ```
/// use monofold::testing::uniform_data;
///
/// let data = uniform_data(100, -1.0, 1.0, 7);
/// assert!(data.iter().all(|&x| (-1.0..1.0).contains(&x)));
/// assert_eq!(data, uniform_data(100, -1.0, 1.0, 7));
/// ```
#[must_use]
pub fn uniform_data(count: usize, min: f64, max: f64, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^= z >> 31;
            #[allow(clippy::cast_precision_loss)]
            let unit = (z >> 11) as f64 / (1_u64 << 53) as f64;
            min + unit * (max - min)
        })
        .collect()
}

/// `0, 1, ..., n - 1` as floats.
#[must_use]
pub fn sequential_data(n: u32) -> Vec<f64> {
    (0..n).map(f64::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_concatenates_in_order() {
        let data = TestDataBuilder::<f64>::new()
            .add_range(1..=3)
            .add_generated(2, |i| i as f64 * 10.0)
            .build();
        assert_eq!(data, vec![1.0, 2.0, 3.0, 0.0, 10.0]);
    }
}
