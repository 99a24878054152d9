use crate::error::MergeResult;
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};

/// A reducer over the running result of another.
///
/// Each datum updates `first`, then `second` is updated with
/// `first.result()`, the cumulative summary so far. A running sum followed
/// by a running max therefore tracks the largest partial sum, not the
/// largest input.
///
/// `result()` is `second.result()`; [`intermediate`](Self::intermediate)
/// exposes `first.result()`.
///
/// # Merge
///
/// Children merge pairwise. `second` on each side saw the partial summaries
/// of its own stream only, so the merged `second` is exact only when its
/// view of the combined stream would have been the same (e.g. a max of a
/// non-decreasing summary). Treat it as an approximation otherwise.
///
/// ```
/// use monofold::{compose::ReducerExt, Max, Reducer, Sum};
///
/// let mut peak = Sum::<i64>::new().then(Max::new());
/// peak.update_all([1, 2, 3]);
/// assert_eq!(peak.result(), Some(6));
/// assert_eq!(peak.intermediate(), 6);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequential<A, B> {
    first: A,
    second: B,
}

impl<A, B> Sequential<A, B> {
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub const fn first(&self) -> &A {
        &self.first
    }

    pub const fn second(&self) -> &B {
        &self.second
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Reducer, B> Sequential<A, B> {
    /// The upstream reducer's current result.
    pub fn intermediate(&self) -> A::Output {
        self.first.result()
    }
}

impl<A, B> Reducer for Sequential<A, B>
where
    A: Reducer,
    B: Reducer<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn identity(&self) -> Self {
        Self::new(self.first.identity(), self.second.identity())
    }

    fn update(&mut self, value: Self::Input) -> &mut Self {
        self.first.update(value);
        self.second.update(self.first.result());
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        let first = self.first.clone().merged(&other.first)?;
        self.second.merge(&other.second)?;
        self.first = first;
        Ok(())
    }

    fn result(&self) -> Self::Output {
        self.second.result()
    }
}
