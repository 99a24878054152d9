use crate::error::MergeResult;
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};

/// N reducers fed the same stream, with a flat tuple result.
///
/// `Fanout((a, b, c))` behaves like `a.and(b).and(c)` but produces
/// `(ra, rb, rc)` instead of `((ra, rb), rc)`. Implemented for tuples of
/// 1 to 12 reducers sharing one `Input: Clone`.
///
/// Merge is all-or-nothing: if any child merge fails, `self` is unchanged.
///
/// ```
/// use monofold::{compose::Fanout, Count, KbnSum, MinMax, Reducer, Welford};
///
/// let mut stats = Fanout::new((KbnSum::new(), Welford::new(), MinMax::new(), Count::new()));
/// stats.update_all([4.0, 8.0, 6.0]);
/// let (sum, mean, bounds, n) = stats.result();
/// assert_eq!(sum, 18.0);
/// assert_eq!(mean, 6.0);
/// assert_eq!(bounds, Some((4.0, 8.0)));
/// assert_eq!(n, 3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fanout<T>(pub T);

impl<T> Fanout<T> {
    pub const fn new(children: T) -> Self {
        Self(children)
    }

    /// The child reducers.
    pub const fn children(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

macro_rules! impl_fanout {
    ($($name:ident : $idx:tt),+) => {
        impl<In, $($name),+> Reducer for Fanout<($($name,)+)>
        where
            In: Clone,
            $($name: Reducer<Input = In>,)+
        {
            type Input = In;
            type Output = ($(<$name as Reducer>::Output,)+);

            fn identity(&self) -> Self {
                Fanout(($(self.0.$idx.identity(),)+))
            }

            fn update(&mut self, value: In) -> &mut Self {
                $(self.0.$idx.update(value.clone());)+
                self
            }

            fn merge(&mut self, other: &Self) -> MergeResult {
                let mut staged = self.0.clone();
                $(staged.$idx.merge(&other.0.$idx)?;)+
                self.0 = staged;
                Ok(())
            }

            fn result(&self) -> Self::Output {
                ($(self.0.$idx.result(),)+)
            }
        }
    };
}

impl_fanout!(A: 0);
impl_fanout!(A: 0, B: 1);
impl_fanout!(A: 0, B: 1, C: 2);
impl_fanout!(A: 0, B: 1, C: 2, D: 3);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10);
impl_fanout!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10, L: 11);
