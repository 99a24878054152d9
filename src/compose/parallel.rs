use crate::error::MergeResult;
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};

/// Two reducers fed the same stream.
///
/// Every datum is cloned into `first` and moved into `second`; merge is
/// pairwise; the result is `(first.result(), second.result())`.
///
/// Nesting is structural: `a.and(b).and(c)` yields `((A, B), C)` results
/// while `a.and(b.and(c))` yields `(A, (B, C))`. Use
/// [`Fanout`](crate::compose::Fanout) for a flat tuple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Parallel<A, B> {
    first: A,
    second: B,
}

impl<A, B> Parallel<A, B> {
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

impl<A, B> Reducer for Parallel<A, B>
where
    A: Reducer,
    A::Input: Clone,
    B: Reducer<Input = A::Input>,
{
    type Input = A::Input;
    type Output = (A::Output, B::Output);

    fn identity(&self) -> Self {
        Self::new(self.first.identity(), self.second.identity())
    }

    fn update(&mut self, value: Self::Input) -> &mut Self {
        self.first.update(value.clone());
        self.second.update(value);
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        // Stage the first merge so a failing second merge leaves self intact.
        let first = self.first.clone().merged(&other.first)?;
        self.second.merge(&other.second)?;
        self.first = first;
        Ok(())
    }

    fn result(&self) -> Self::Output {
        (self.first.result(), self.second.result())
    }
}
