//! Combining lists of partial reducers.

use crate::error::TypeMismatchError;
use crate::reducer::Reducer;
use rayon::prelude::*;
use tracing::debug;

/// Left fold: `((p0 ⊕ p1) ⊕ p2) ⊕ ...`. Depth `N - 1`.
///
/// An empty list yields `prototype.identity()`.
pub fn linear_merge<R: Reducer>(prototype: &R, parts: Vec<R>) -> Result<R, TypeMismatchError> {
    let mut it = parts.into_iter();
    let Some(mut acc) = it.next() else {
        return Ok(prototype.identity());
    };
    for part in it {
        acc.merge(&part)?;
    }
    Ok(acc)
}

/// Pairwise tree reduction: adjacent pairs are merged level by level until
/// one reducer remains. Depth `ceil(log2 N)`.
///
/// Partition order is preserved: the left operand of every merge covers
/// earlier data than the right one. Compared with [`linear_merge`], each
/// merge combines operands of similar magnitude, which keeps compensated
/// sums tighter.
///
/// An empty list yields `prototype.identity()`.
pub fn tree_merge<R: Reducer>(prototype: &R, parts: Vec<R>) -> Result<R, TypeMismatchError> {
    let mut level = parts;
    let mut depth = 0usize;
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut it = level.into_iter();
        while let Some(mut left) = it.next() {
            if let Some(right) = it.next() {
                left.merge(&right)?;
            }
            next.push(left);
        }
        level = next;
        depth += 1;
    }
    debug!(depth, "tree merge complete");
    Ok(level.pop().unwrap_or_else(|| prototype.identity()))
}

/// [`tree_merge`] with the merges of each level run on the rayon pool.
///
/// Produces the same pairing, and hence the same result, as `tree_merge`.
pub fn par_tree_merge<R>(prototype: &R, parts: Vec<R>) -> Result<R, TypeMismatchError>
where
    R: Reducer + Send + Sync,
{
    let mut level = parts;
    let mut depth = 0usize;
    while level.len() > 1 {
        level = level
            .into_par_iter()
            .chunks(2)
            .map(|pair| {
                let mut it = pair.into_iter();
                let Some(mut left) = it.next() else {
                    return Ok(prototype.identity());
                };
                for right in it {
                    left.merge(&right)?;
                }
                Ok(left)
            })
            .collect::<Result<Vec<R>, TypeMismatchError>>()?;
        depth += 1;
    }
    debug!(depth, "parallel tree merge complete");
    Ok(level.pop().unwrap_or_else(|| prototype.identity()))
}
