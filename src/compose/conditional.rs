//! Predicate-dispatched composition.
//!
//! Two flavors:
//!
//! - [`Conditional`] holds exactly one active branch. Switching branches
//!   discards the previously active state.
//! - [`Routed`] keeps both branches alive for the reducer's whole life and
//!   routes each datum to one of them.

use crate::error::{MergeResult, TypeMismatchError};
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One of two alternatives, used both as a conditional's state and its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch<L, R> {
    First(L),
    Second(R),
}

impl<L, R> Branch<L, R> {
    pub const fn is_first(&self) -> bool {
        matches!(self, Self::First(_))
    }

    pub const fn is_second(&self) -> bool {
        matches!(self, Self::Second(_))
    }

    pub fn first(self) -> Option<L> {
        match self {
            Self::First(l) => Some(l),
            Self::Second(_) => None,
        }
    }

    pub fn second(self) -> Option<R> {
        match self {
            Self::First(_) => None,
            Self::Second(r) => Some(r),
        }
    }

    pub const fn as_ref(&self) -> Branch<&L, &R> {
        match self {
            Self::First(l) => Branch::First(l),
            Self::Second(r) => Branch::Second(r),
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::First(_) => "first branch active",
            Self::Second(_) => "second branch active",
        }
    }
}

impl<T> Branch<T, T> {
    /// The value of whichever side is present.
    pub fn into_inner(self) -> T {
        match self {
            Self::First(v) | Self::Second(v) => v,
        }
    }
}

/// Dispatch each datum to `A` when `predicate` holds and to `B` otherwise,
/// keeping only the active branch.
///
/// When the selected branch differs from the active one, the active state is
/// dropped and the newly selected branch restarts from its identity before
/// the datum is applied. Values are never carried across a switch.
///
/// A fresh conditional starts with `A` active holding the reducer passed to
/// [`new`](Self::new).
///
/// # Merge
///
/// - Two conditionals with the same active branch merge that branch, so a
///   seed passed to [`new`](Self::new) is kept.
/// - When the active branches differ and one side never received an update,
///   that side yields to the other, as an update on the other branch would
///   have discarded it.
/// - Two updated conditionals with different active branches cannot be
///   merged and return [`TypeMismatchError`]. Use [`Routed`] when partial
///   states must always be mergeable.
///
/// ```
/// use monofold::{compose::{Branch, ReducerExt}, Reducer, Sum};
///
/// let mut c = Sum::<i32>::new().when(Sum::new(), |x: &i32| *x < 3);
/// c.update_all([1, 2, 4, 5]);
/// assert_eq!(c.result(), Branch::Second(9));
/// ```
#[derive(Clone)]
pub struct Conditional<A, B, P> {
    first_identity: A,
    second_identity: B,
    active: Branch<A, B>,
    predicate: P,
    updates: u64,
}

impl<A, B, P> Conditional<A, B, P>
where
    A: Reducer,
    B: Reducer<Input = A::Input>,
    P: Fn(&A::Input) -> bool + Clone,
{
    pub fn new(first: A, second: B, predicate: P) -> Self {
        Self {
            first_identity: first.identity(),
            second_identity: second.identity(),
            active: Branch::First(first),
            predicate,
            updates: 0,
        }
    }

    /// The active branch's state.
    pub const fn active(&self) -> Branch<&A, &B> {
        self.active.as_ref()
    }

    /// Number of updates applied since construction, across switches.
    pub const fn updates(&self) -> u64 {
        self.updates
    }
}

impl<A, B, P> std::fmt::Debug for Conditional<A, B, P>
where
    A: std::fmt::Debug,
    B: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conditional")
            .field("active", &self.active)
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}

impl<A, B, P> Reducer for Conditional<A, B, P>
where
    A: Reducer,
    B: Reducer<Input = A::Input>,
    P: Fn(&A::Input) -> bool + Clone,
{
    type Input = A::Input;
    type Output = Branch<A::Output, B::Output>;

    fn identity(&self) -> Self {
        Self {
            first_identity: self.first_identity.clone(),
            second_identity: self.second_identity.clone(),
            active: Branch::First(self.first_identity.clone()),
            predicate: self.predicate.clone(),
            updates: 0,
        }
    }

    fn update(&mut self, value: Self::Input) -> &mut Self {
        let take_first = (self.predicate)(&value);
        match (&mut self.active, take_first) {
            (Branch::First(a), true) => {
                a.update(value);
            }
            (Branch::Second(b), false) => {
                b.update(value);
            }
            (Branch::Second(_), true) => {
                trace!("conditional switched to first branch");
                let mut a = self.first_identity.clone();
                a.update(value);
                self.active = Branch::First(a);
            }
            (Branch::First(_), false) => {
                trace!("conditional switched to second branch");
                let mut b = self.second_identity.clone();
                b.update(value);
                self.active = Branch::Second(b);
            }
        }
        self.updates += 1;
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if self.active.is_first() != other.active.is_first() {
            if other.updates == 0 {
                return Ok(());
            }
            if self.updates == 0 {
                self.active = other.active.clone();
                self.updates = other.updates;
                return Ok(());
            }
        }
        match (&mut self.active, &other.active) {
            (Branch::First(a), Branch::First(b)) => a.merge(b)?,
            (Branch::Second(a), Branch::Second(b)) => a.merge(b)?,
            (mine, theirs) => {
                return Err(TypeMismatchError::new(
                    "Conditional",
                    mine.name(),
                    theirs.name(),
                ));
            }
        }
        self.updates += other.updates;
        Ok(())
    }

    fn result(&self) -> Self::Output {
        match &self.active {
            Branch::First(a) => Branch::First(a.result()),
            Branch::Second(b) => Branch::Second(b.result()),
        }
    }
}

/// Dispatch each datum to `A` when `predicate` holds and to `B` otherwise,
/// keeping both branches.
///
/// Unlike [`Conditional`], no state is ever discarded: `result()` returns both
/// branch results and merge is pairwise, so it always succeeds when the
/// branches' own merges do.
///
/// ```
/// use monofold::{compose::ReducerExt, Count, Reducer, Sum};
///
/// let mut r = Sum::<i32>::new().route(Count::new(), |x: &i32| *x >= 0);
/// r.update_all([3, -1, 4, -1, 5]);
/// assert_eq!(r.result(), (12, 2));
/// ```
#[derive(Clone)]
pub struct Routed<A, B, P> {
    first: A,
    second: B,
    predicate: P,
}

impl<A, B, P> Routed<A, B, P>
where
    A: Reducer,
    B: Reducer<Input = A::Input>,
    P: Fn(&A::Input) -> bool + Clone,
{
    pub const fn new(first: A, second: B, predicate: P) -> Self {
        Self {
            first,
            second,
            predicate,
        }
    }

    pub const fn first(&self) -> &A {
        &self.first
    }

    pub const fn second(&self) -> &B {
        &self.second
    }
}

impl<A, B, P> std::fmt::Debug for Routed<A, B, P>
where
    A: std::fmt::Debug,
    B: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routed")
            .field("first", &self.first)
            .field("second", &self.second)
            .finish_non_exhaustive()
    }
}

impl<A, B, P> Reducer for Routed<A, B, P>
where
    A: Reducer,
    B: Reducer<Input = A::Input>,
    P: Fn(&A::Input) -> bool + Clone,
{
    type Input = A::Input;
    type Output = (A::Output, B::Output);

    fn identity(&self) -> Self {
        Self::new(
            self.first.identity(),
            self.second.identity(),
            self.predicate.clone(),
        )
    }

    fn update(&mut self, value: Self::Input) -> &mut Self {
        if (self.predicate)(&value) {
            self.first.update(value);
        } else {
            self.second.update(value);
        }
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        let first = self.first.clone().merged(&other.first)?;
        self.second.merge(&other.second)?;
        self.first = first;
        Ok(())
    }

    fn result(&self) -> Self::Output {
        (self.first.result(), self.second.result())
    }
}
