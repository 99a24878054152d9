use anyhow::Result;
use monofold::algebra::{fmap, pure};
use monofold::compose::{Branch, Conditional, Fanout, Parallel, ReducerExt, Sequential};
use monofold::{Count, KbnSum, Max, Min, MinMax, Reducer, Sum, Welford, fold};

/* ===== Parallel ===== */

#[test]
fn parallel_feeds_both_sides() {
    let r = fold(&KbnSum::new().and(Welford::new()), [2.0, 4.0, 6.0]);
    assert_eq!(r.result(), (12.0, 4.0));
    assert_eq!(r.first().result(), 12.0);
    assert_eq!(r.second().count(), 3);
}

#[test]
fn parallel_merge_equals_concatenated_fold() -> Result<()> {
    let proto = Sum::<i64>::new().and(MinMax::<i64>::new());
    let chunk_a: Vec<i64> = (0..50).collect();
    let chunk_b: Vec<i64> = (50..120).rev().collect();

    let whole = fold(&proto, chunk_a.iter().chain(&chunk_b).copied());
    let merged = fold(&proto, chunk_a.iter().copied()).merged(&fold(&proto, chunk_b.iter().copied()))?;
    assert_eq!(merged.result(), whole.result());
    assert_eq!(merged.result(), (7140, Some((0, 119))));
    Ok(())
}

#[test]
fn parallel_nests() {
    let r = fold(
        &Parallel::new(Count::<f64>::new(), Parallel::new(Min::new(), Max::new())),
        [3.0, -1.0, 8.0],
    );
    assert_eq!(r.result(), (3, (Some(-1.0), Some(8.0))));
    let (count, extrema) = r.into_parts();
    assert_eq!(count.result(), 3);
    assert_eq!(extrema.result(), (Some(-1.0), Some(8.0)));
}

/* ===== Sequential ===== */

#[test]
fn sequential_feeds_running_result_downstream() {
    let r = fold(&Sum::<i32>::new().then(Max::new()), [1, 2, 3]);
    // Max of partial sums {1, 3, 6}, not of the raw inputs.
    assert_eq!(r.result(), Some(6));
    assert_eq!(r.intermediate(), 6);
}

#[test]
fn sequential_tracks_running_mean_extremes() {
    let r = fold(
        &Sequential::new(Welford::new(), MinMax::<f64>::new()),
        [10.0, 0.0, 20.0],
    );
    // Running means: 10, 5, 10.
    assert_eq!(r.result(), Some((5.0, 10.0)));
    assert_eq!(r.first().count(), 3);
}

#[test]
fn sequential_identity_is_empty() {
    let r = fold(&Sum::<i32>::new().then(Count::new()), [5, 5]);
    let id = r.identity();
    assert_eq!(id.result(), 0);
    assert_eq!(id.intermediate(), 0);
}

/* ===== Conditional ===== */

#[test]
fn conditional_discards_state_on_switch() {
    let c = fold(&Sum::<i32>::new().when(Sum::new(), |x: &i32| *x < 3), [1, 2, 4, 5]);
    assert_eq!(c.result(), Branch::Second(9));
    assert_eq!(c.updates(), 4);
    assert!(c.active().is_second());
}

#[test]
fn conditional_restarts_first_branch_from_identity() {
    let c = fold(
        &Sum::<i32>::new().when(Count::new(), |x: &i32| *x >= 0),
        [5, 6, -1, -2, 7],
    );
    // 5 + 6 were dropped at the switch to Count; Count was dropped at 7.
    assert_eq!(c.result(), Branch::First(7));
}

#[test]
fn fresh_conditional_starts_on_first_branch() {
    let c = Conditional::new(Sum::<i32>::new(), Sum::new(), |x: &i32| *x > 0);
    assert_eq!(c.result(), Branch::First(0));
    assert!(c.active().is_first());
}

#[test]
fn conditional_merge_same_branch() -> Result<()> {
    let proto = Sum::<i32>::new().when(Sum::new(), |x: &i32| *x < 10);
    let a = fold(&proto, [1, 2]);
    let b = fold(&proto, [3]);
    let m = a.merged(&b)?;
    assert_eq!(m.result(), Branch::First(6));
    assert_eq!(m.updates(), 3);
    Ok(())
}

#[test]
fn conditional_merge_with_untouched_side() -> Result<()> {
    let proto = Sum::<i32>::new().when(Sum::new(), |x: &i32| *x < 10);
    let b = fold(&proto, [20, 30]);
    let m = proto.clone().merged(&b)?;
    assert_eq!(m.result(), Branch::Second(50));
    let m2 = b.merged(&proto)?;
    assert_eq!(m2.result(), Branch::Second(50));
    Ok(())
}

#[test]
fn conditional_seed_survives_merge() -> Result<()> {
    let seeded = Conditional::new(Sum::<i32>::from_value(10), Sum::new(), |x: &i32| *x < 3);

    assert_eq!(seeded.identity().merged(&seeded)?.result(), Branch::First(10));
    assert_eq!(seeded.clone().merged(&seeded.identity())?.result(), Branch::First(10));

    let other = fold(&seeded, [1]);
    assert_eq!(seeded.clone().merged(&other)?.result(), Branch::First(11));
    assert_eq!(other.merged(&seeded)?.result(), Branch::First(11));
    Ok(())
}

#[test]
fn conditional_merge_across_branches_fails() {
    let proto = Sum::<i32>::new().when(Sum::new(), |x: &i32| *x < 10);
    let mut a = fold(&proto, [1]);
    let b = fold(&proto, [20]);
    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.component, "Conditional");
    assert_eq!(a.result(), Branch::First(1));
}

/* ===== Routed ===== */

#[test]
fn routed_keeps_both_partitions() -> Result<()> {
    let proto = Sum::<i32>::new().route(Count::new(), |x: &i32| x % 2 == 0);
    let a = fold(&proto, [1, 2, 3, 4]);
    let b = fold(&proto, [5, 6]);
    assert_eq!(a.result(), (6, 2));
    // Branches stay mergeable no matter which saw the last datum.
    let m = a.merged(&b)?;
    assert_eq!(m.result(), (12, 3));
    Ok(())
}

/* ===== Fanout ===== */

#[test]
fn fanout_flat_tuple_result() -> Result<()> {
    let proto = Fanout::new((Sum::<i32>::new(), Count::new(), Min::new(), Max::new()));
    let a = fold(&proto, [4, 1, 9]);
    let b = fold(&proto, [7]);
    assert_eq!(a.result(), (14, 3, Some(1), Some(9)));
    assert_eq!(a.merged(&b)?.result(), (21, 4, Some(1), Some(9)));
    Ok(())
}

#[test]
fn fanout_of_twelve() {
    let proto = Fanout::new((
        Sum::<i32>::new(),
        Count::new(),
        Min::new(),
        Max::new(),
        Sum::new(),
        Count::new(),
        Min::new(),
        Max::new(),
        Sum::new(),
        Count::new(),
        Min::new(),
        Max::new(),
    ));
    let r = fold(&proto, [2, 3]);
    let out = r.result();
    assert_eq!(out.0, 5);
    assert_eq!(out.5, 2);
    assert_eq!(out.11, Some(3));
}

#[test]
fn fanout_single_child() {
    let r = fold(&Fanout::new((Count::<u8>::new(),)), [0, 0, 0]);
    assert_eq!(r.result(), (3,));
    assert_eq!(r.children().0.result(), 3);
}

/* ===== Functor map and constant reducer ===== */

#[test]
fn map_result_transforms_output_only() -> Result<()> {
    let proto = Welford::new().map_result(|mean| mean * 100.0);
    let a = fold(&proto, [0.25, 0.75]);
    assert_eq!(a.result(), 50.0);
    let merged = a.merged(&fold(&proto, [0.5]))?;
    assert_eq!(merged.result(), 50.0);
    assert_eq!(merged.inner().count(), 3);
    Ok(())
}

#[test]
fn fmap_matches_map_result() {
    let a = fold(&fmap(|n: u64| n * 2, Count::<i32>::new()), [1, 2, 3]);
    assert_eq!(a.result(), 6);
}

#[test]
fn pure_ignores_input() -> Result<()> {
    let p = fold(&pure::<f64, &str>("constant"), [1.0, 2.0]);
    assert_eq!(p.result(), "constant");
    assert_eq!(p.identity().merged(&p)?.result(), "constant");
    Ok(())
}
