use anyhow::Result;
use monofold::compose::ReducerExt;
use monofold::sync::{ConcurrentReducer, Locked, RwLocked, Sharded};
use monofold::testing::hammer;
use monofold::{Count, KbnSum, Max, MinMax, Reducer, Sum, Welford};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 2_000;

/* ===== Sharded ===== */

#[test]
fn sharded_sum_counts_every_update() -> Result<()> {
    let total = Sharded::new(Sum::<u64>::new(), 4);
    let updates = hammer(&total, THREADS, PER_THREAD, |_, _| 3);
    let n = (THREADS * PER_THREAD) as u64;
    assert_eq!(updates, n);
    assert_eq!(total.result()?, n * 3);
    Ok(())
}

#[test]
fn sharded_zero_means_one_per_cpu() {
    let s = Sharded::new(Count::<()>::new(), 0);
    assert_eq!(s.shard_count(), num_cpus::get().max(1));
    assert_eq!(Sharded::with_default_shards(Count::<()>::new()).shard_count(), s.shard_count());
}

#[test]
fn sharded_welford_matches_sequential() -> Result<()> {
    let shared = Sharded::new(Welford::new(), 3);
    hammer(&shared, 4, 500, |t, i| (t * 500 + i) as f64);
    let snap = shared.snapshot()?;
    assert_eq!(snap.count(), 2000);
    assert!((snap.mean() - 999.5).abs() < 1e-9);
    assert!((snap.variance() - (2000.0_f64.powi(2) - 1.0) / 12.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn sharded_merge_and_swap() -> Result<()> {
    let a = Sharded::new(Sum::<i64>::new(), 4);
    let b = Sharded::new(Sum::<i64>::new(), 2);
    hammer(&a, 2, 10, |_, _| 1);
    hammer(&b, 2, 5, |_, _| 10);

    a.merge(&b)?;
    assert_eq!(a.result()?, 20 + 100);
    assert_eq!(a.updates(), 30);

    let drained = a.swap_and_reset()?;
    assert_eq!(drained.result(), 120);
    assert_eq!(a.result()?, 0);
    assert_eq!(a.updates(), 0);

    a.merge_reducer(&Sum::from_value(7))?;
    assert_eq!(a.into_inner()?.result(), 7);
    Ok(())
}

#[test]
fn sharded_self_merge_doubles() -> Result<()> {
    let a = Sharded::new(Sum::<i32>::new(), 2);
    a.update(21);
    a.merge(&a)?;
    assert_eq!(a.result()?, 42);
    Ok(())
}

#[test]
fn sharded_surfaces_merge_mismatch() {
    let proto = Sum::<i32>::new().when(Sum::new(), |x: &i32| *x > 0);
    let shared = Sharded::new(proto.clone(), 1);
    shared.update(1);

    let mut negative = proto;
    negative.update(-1);
    assert!(shared.merge_reducer(&negative).is_err());
    assert_eq!(shared.result().ok(), Some(monofold::compose::Branch::First(1)));
}

/* ===== Locked ===== */

#[test]
fn locked_concurrent_updates() {
    let sum = Arc::new(Locked::new(KbnSum::new()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sum = Arc::clone(&sum);
            thread::spawn(move || {
                for _ in 0..1000 {
                    sum.update(0.5);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer thread panicked");
    }
    assert_eq!(sum.result(), 2000.0);
    assert_eq!(sum.updates(), 4000);
}

#[test]
fn locked_cross_merge_does_not_deadlock() -> Result<()> {
    let a = Locked::new(Max::from_value(1_u64));
    let b = Locked::new(Max::from_value(2_u64));
    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..500 {
                a.merge(&Locked::new(Max::new())).ok();
                a.merge(&b).ok();
            }
        });
        s.spawn(|| {
            for _ in 0..500 {
                b.merge(&a).ok();
            }
        });
    });
    assert_eq!(a.result(), Some(2));
    assert_eq!(b.result(), Some(2));
    Ok(())
}

#[test]
fn locked_snapshot_reset_swap() -> Result<()> {
    let w = Locked::new(MinMax::<i32>::new());
    w.update(5);
    w.update(-5);
    assert_eq!(w.snapshot().result(), Some((-5, 5)));

    let taken = w.swap_and_reset();
    assert_eq!(taken.result(), Some((-5, 5)));
    assert_eq!(w.result(), None);
    assert_eq!(w.updates(), 0);

    w.merge_reducer(&MinMax::from_value(3))?;
    w.merge(&w)?;
    assert_eq!(w.into_inner().result(), Some((3, 3)));

    let l: Locked<Sum<i32>> = Locked::default();
    l.update(1);
    l.reset();
    assert_eq!(l.result(), 0);
    Ok(())
}

/* ===== RwLocked ===== */

#[test]
fn rwlocked_readers_and_writers() -> Result<()> {
    let shared = RwLocked::new(Welford::new());
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for i in 0..250 {
                    shared.update(f64::from(i));
                }
            });
        }
        for _ in 0..2 {
            s.spawn(|| {
                for _ in 0..100 {
                    let n = shared.snapshot().count();
                    assert!(n <= 1000);
                }
            });
        }
    });
    assert_eq!(shared.updates(), 1000);
    assert!((shared.result() - 124.5).abs() < 1e-9);

    let other = RwLocked::new(Welford::from_value(124.5));
    shared.merge(&other)?;
    assert_eq!(shared.snapshot().count(), 1001);
    Ok(())
}

/* ===== Trait object use ===== */

fn drive<C: ConcurrentReducer<Reducer = Sum<u32>>>(c: &C) -> Result<u32> {
    hammer(c, 3, 100, |_, _| 2);
    Ok(c.result()?)
}

#[test]
fn every_wrapper_implements_concurrent_reducer() -> Result<()> {
    assert_eq!(drive(&Locked::new(Sum::<u32>::new()))?, 600);
    assert_eq!(drive(&RwLocked::new(Sum::<u32>::new()))?, 600);
    assert_eq!(drive(&Sharded::new(Sum::<u32>::new(), 5))?, 600);
    Ok(())
}
