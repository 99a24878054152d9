use anyhow::Result;
use monofold::window::{Clock, CountWindow, ManualClock, TimeWindow};
use monofold::{Count, KbnSum, MinMax, Reducer, Sum, Welford};
use std::time::Duration;

/* ===== CountWindow ===== */

#[test]
fn count_window_keeps_most_recent_values() -> Result<()> {
    let mut w = CountWindow::new(Welford::new(), 4)?;
    w.update_all([100.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(w.len(), 4);
    assert!(w.is_full());
    assert_eq!(w.capacity(), 4);
    assert!((w.result() - 2.5).abs() < 1e-12);
    assert_eq!(w.values().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);
    Ok(())
}

#[test]
fn count_window_rejects_zero_capacity() {
    let err = CountWindow::new(Sum::<i32>::new(), 0).unwrap_err();
    assert_eq!(err.component, "CountWindow");
}

#[test]
fn count_window_partial_and_clear() -> Result<()> {
    let mut w = CountWindow::new(MinMax::<i32>::new(), 10)?;
    assert!(w.is_empty());
    assert_eq!(w.result(), None);
    w.update_all([3, 9, -2]);
    assert!(!w.is_full());
    assert_eq!(w.result(), Some((-2, 9)));
    assert_eq!(w.reducer().result(), Some((-2, 9)));
    w.clear();
    assert_eq!(w.result(), None);
    Ok(())
}

#[test]
fn count_window_result_is_refreshed_after_update() -> Result<()> {
    let mut w = CountWindow::new(Sum::<i32>::new(), 2)?;
    w.update(1);
    assert_eq!(w.result(), 1);
    w.update(2);
    assert_eq!(w.result(), 3);
    w.update(3);
    assert_eq!(w.result(), 5);
    Ok(())
}

#[test]
fn count_window_merge_replays_other_after_self() -> Result<()> {
    let proto = CountWindow::new(Sum::<i32>::new(), 3)?;
    let mut a = proto.identity();
    a.update_all([1, 2]);
    let mut b = proto.identity();
    b.update_all([10, 20]);
    a.merge(&b)?;
    // Window over [1, 2, 10, 20] keeps [2, 10, 20].
    assert_eq!(a.result(), 32);

    let other = CountWindow::new(Sum::<i32>::new(), 4)?;
    assert!(a.merge(&other).is_err());
    Ok(())
}

/* ===== TimeWindow ===== */

#[test]
fn time_window_expires_by_age() -> Result<()> {
    let clock = ManualClock::new();
    let mut w = TimeWindow::with_clock(KbnSum::new(), Duration::from_secs(60), clock.clone())?;
    w.update(1.0);
    clock.advance(Duration::from_secs(30));
    w.update(2.0);
    clock.advance(Duration::from_secs(30));
    // First entry is exactly `duration` old: still live.
    assert_eq!(w.result(), 3.0);
    clock.advance(Duration::from_millis(1));
    assert_eq!(w.result(), 2.0);
    assert_eq!(w.len(), 1);
    clock.advance(Duration::from_secs(60));
    assert!(w.is_empty());
    assert_eq!(w.result(), 0.0);
    Ok(())
}

#[test]
fn time_window_rejects_zero_or_invalid_duration() {
    assert!(TimeWindow::new(Count::<u8>::new(), Duration::ZERO).is_err());
    assert!(TimeWindow::from_secs_f64(Count::<u8>::new(), -1.0).is_err());
    assert!(TimeWindow::from_secs_f64(Count::<u8>::new(), f64::NAN).is_err());
    let ok = TimeWindow::from_secs_f64(Count::<u8>::new(), 1.5);
    assert_eq!(ok.map(|w| w.duration()).ok(), Some(Duration::from_millis(1500)));
}

#[test]
fn time_window_update_at_back_dated() -> Result<()> {
    let clock = ManualClock::new();
    let t0 = clock.now();
    clock.advance(Duration::from_secs(100));
    let mut w = TimeWindow::with_clock(Sum::<i32>::new(), Duration::from_secs(10), clock.clone())?;
    w.update_at(1, t0);
    w.update_at(5, t0 + Duration::from_secs(95));
    assert_eq!(w.result(), 5);
    assert_eq!(w.len(), 1);
    Ok(())
}

#[test]
fn time_window_merge_interleaves_by_timestamp() -> Result<()> {
    let clock = ManualClock::new();
    let proto = TimeWindow::with_clock(Count::<i32>::new(), Duration::from_secs(10), clock.clone())?;
    let mut a = proto.identity();
    let mut b = proto.identity();
    a.update(1);
    clock.advance(Duration::from_secs(4));
    b.update(2);
    clock.advance(Duration::from_secs(4));
    a.update(3);
    a.merge(&b)?;
    assert_eq!(a.result(), 3);
    clock.advance(Duration::from_secs(3));
    // Only the entries from t = 4 and t = 8 remain.
    assert_eq!(a.result(), 2);
    clock.advance(Duration::from_secs(4));
    assert_eq!(a.result(), 1);

    let wider = TimeWindow::with_clock(Count::<i32>::new(), Duration::from_secs(20), clock.clone())?;
    assert!(a.merge(&wider).is_err());
    Ok(())
}

#[test]
fn time_window_clear_and_reducer_copy() -> Result<()> {
    let clock = ManualClock::new();
    let mut w = TimeWindow::with_clock(Welford::new(), Duration::from_secs(1), clock)?;
    w.update_all([2.0, 4.0]);
    let snapshot = w.reducer();
    assert_eq!(snapshot.count(), 2);
    w.clear();
    assert_eq!(w.reducer().count(), 0);
    assert_eq!(snapshot.mean(), 3.0);
    Ok(())
}

#[test]
fn monotonic_window_sees_fresh_updates() -> Result<()> {
    let mut w = TimeWindow::new(Sum::<u32>::new(), Duration::from_secs(3600))?;
    w.update_all([1, 2, 3]);
    assert_eq!(w.result(), 6);
    Ok(())
}
