//! Integration tests demonstrating the testing utilities.

use anyhow::Result;
use monofold::compose::ReducerExt;
use monofold::sync::{Locked, Sharded};
use monofold::testing::*;
use monofold::*;

/* ===== Assertions ===== */

#[test]
fn merge_consistency_for_builtin_reducers() -> Result<()> {
    let data = TestDataBuilder::new()
        .add_uniform(40, -10.0, 10.0, 3)
        .add_values(numeric_data_with_outliers())
        .build();
    assert_merge_consistent(&KbnSum::new(), &data, 1e-12);
    assert_merge_consistent(&Welford::new(), &data, 1e-9);
    assert_merge_consistent(&MinMax::<f64>::new(), &data, 0.0);
    assert_merge_consistent(&Histogram::new(-20.0, 20.0, 8)?, &data, 0.0);
    assert_merge_consistent(&KbnSum::new().and(Count::new()), &data, 1e-12);
    Ok(())
}

#[test]
fn identity_laws_for_populated_reducers() -> Result<()> {
    let data = uniform_data(100, 0.0, 1.0, 1);
    assert_identity_laws(&fold(&Welford::new(), data.iter().copied()), 0.0);
    assert_identity_laws(&fold(&P2Quantile::new(0.3)?, data.iter().copied()), 0.0);
    assert_identity_laws(&fold(&Ema::from_period(10)?, data.iter().copied()), 0.0);
    Ok(())
}

#[test]
fn associativity_helper() {
    let parts: Vec<Welford> = [vec![1.0, 2.0], vec![10.0], vec![-4.0, 0.5, 0.25]]
        .iter()
        .map(|v| fold(&Welford::new(), v.iter().copied()))
        .collect();
    assert_associative(&parts[0], &parts[1], &parts[2], 1e-12);
}

#[test]
#[should_panic(expected = "disagrees with single pass")]
fn merge_consistency_detects_broken_reducer() {
    // The running maximum of partial sums is order-sensitive across splits.
    let proto = Sum::<i32>::new().then(Max::new());
    assert_merge_consistent(&proto, &[5, -10, 5, 5], 0.0);
}

/* ===== Builders and fixtures ===== */

#[test]
fn builder_composes_fixtures() {
    let data = TestDataBuilder::new()
        .add_values(ill_conditioned_sum())
        .add_repeated(0.25, 4)
        .add_generated(3, |i| i as f64)
        .build();
    assert_eq!(data.len(), 11);
    assert_eq!(fold(&KbnSum::new(), data).result(), 6.0);
}

#[test]
fn sequential_and_uniform_data() {
    assert_eq!(sequential_data(4), vec![0.0, 1.0, 2.0, 3.0]);
    let u = uniform_data(1000, 5.0, 6.0, 99);
    let w = fold(&Welford::new(), u.iter().copied());
    assert!((w.mean() - 5.5).abs() < 0.05);
    assert_ne!(u, uniform_data(1000, 5.0, 6.0, 100));
}

#[test]
fn skewed_shards_shape() {
    let shards = skewed_shards();
    let sizes: Vec<usize> = shards.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![1, 10, 100, 1000, 0]);
}

/* ===== Stress ===== */

#[test]
fn hammer_drives_any_wrapper() -> Result<()> {
    let sharded = Sharded::new(Sum::<u64>::new(), 4);
    assert_eq!(hammer(&sharded, 6, 100, |t, _| t as u64), 600);
    assert_eq!(sharded.result()?, 100 * (0 + 1 + 2 + 3 + 4 + 5));

    let locked = Locked::new(Count::<()>::new());
    assert_eq!(hammer(&locked, 2, 50, |_, _| ()), 100);
    assert_eq!(locked.result(), 100);
    Ok(())
}
