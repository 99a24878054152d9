//! Assertion functions for reducer results and laws.

use crate::algebra::{ApproxEq, laws};
use crate::reducer::{Reducer, fold};
use std::fmt::Debug;

/// Assert that `actual` is within `tol` of `expected` under [`ApproxEq`].
///
/// # Panics
///
/// Panics if the values differ by more than the tolerance.
///
/// # Example
///
/// ```
/// use monofold::testing::assert_close;
///
/// assert_close(0.1 + 0.2, 0.3, 1e-12);
/// assert_close((1.0, 2.0), (1.0, 2.0 + 1e-15), 1e-12);
/// ```
pub fn assert_close<T: ApproxEq + Debug>(actual: T, expected: T, tol: f64) {
    assert!(
        actual.approx_eq(&expected, tol),
        "Values differ beyond tolerance {tol}:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that folding `values` in one pass agrees with splitting them at
/// every position, folding each half separately, and merging.
///
/// Also checks the four-way split used by partitioned folds.
///
/// # Panics
///
/// Panics if any split disagrees with the single pass, or if a merge
/// reports a configuration mismatch.
///
/// # Example
///
/// ```
/// use monofold::{Welford, testing::assert_merge_consistent};
///
/// let data: Vec<f64> = (0..50).map(f64::from).collect();
/// assert_merge_consistent(&Welford::new(), &data, 1e-12);
/// ```
pub fn assert_merge_consistent<R>(prototype: &R, values: &[R::Input], tol: f64)
where
    R: Reducer,
    R::Input: Clone,
    R::Output: ApproxEq + Debug,
{
    let whole = fold(prototype, values.iter().cloned()).result();
    for at in 0..=values.len() {
        match laws::split_homomorphism(prototype, values, at, tol) {
            Ok(true) => {}
            Ok(false) => {
                let (xs, ys) = values.split_at(at);
                let split = fold(prototype, xs.iter().cloned())
                    .merged(&fold(prototype, ys.iter().cloned()))
                    .map(|r| r.result());
                panic!(
                    "Split at {at} disagrees with single pass:\n  Single pass: {whole:?}\n  Merged: {split:?}"
                );
            }
            Err(e) => panic!("Merge failed for split at {at}: {e}"),
        }
    }

    let quarter = values.len() / 4;
    if quarter > 0 {
        let parts: Vec<R> = values
            .chunks(quarter)
            .map(|c| fold(prototype, c.iter().cloned()))
            .collect();
        let merged = crate::distributed::tree_merge(prototype, parts)
            .unwrap_or_else(|e| panic!("Tree merge failed: {e}"));
        assert_close(merged.result(), whole, tol);
    }
}

/// Assert both identity laws for `r`: `identity ⊕ r == r == r ⊕ identity`.
///
/// # Panics
///
/// Panics if either law fails or a merge reports a mismatch.
pub fn assert_identity_laws<R>(r: &R, tol: f64)
where
    R: Reducer,
    R::Output: ApproxEq + Debug,
{
    match laws::left_identity(r, tol) {
        Ok(true) => {}
        Ok(false) => panic!("Left identity fails for result {:?}", r.result()),
        Err(e) => panic!("Left identity merge failed: {e}"),
    }
    match laws::right_identity(r, tol) {
        Ok(true) => {}
        Ok(false) => panic!("Right identity fails for result {:?}", r.result()),
        Err(e) => panic!("Right identity merge failed: {e}"),
    }
}

/// Assert `(a ⊕ b) ⊕ c == a ⊕ (b ⊕ c)`.
///
/// # Panics
///
/// Panics if the two groupings disagree or a merge reports a mismatch.
pub fn assert_associative<R>(a: &R, b: &R, c: &R, tol: f64)
where
    R: Reducer,
    R::Output: ApproxEq + Debug,
{
    match laws::associativity(a, b, c, tol) {
        Ok(true) => {}
        Ok(false) => {
            let left = a.clone().merged(b).and_then(|ab| ab.merged(c)).map(|r| r.result());
            let right = b.clone().merged(c).and_then(|bc| a.clone().merged(&bc)).map(|r| r.result());
            panic!("Merge is not associative:\n  (a+b)+c: {left:?}\n  a+(b+c): {right:?}");
        }
        Err(e) => panic!("Associativity merge failed: {e}"),
    }
}
