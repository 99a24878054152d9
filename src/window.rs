//! Windowed reducers.
//!
//! A window constrains a reducer to a recent slice of the stream by keeping
//! the raw values and recomputing the reducer over them on demand:
//!
//! - [`CountWindow`] keeps the `capacity` most recent values.
//! - [`TimeWindow`] keeps values whose timestamp lies within `duration` of
//!   "now", as reported by a [`Clock`].
//!
//! Recomputation is lazy: the first read after a mutation folds every
//! retained value into a fresh identity and caches the result; further reads
//! reuse it. Each read after a change therefore costs O(window length),
//! which suits small to moderate windows. Retained values are never
//! evicted by a background thread.

use crate::error::{ConfigurationError, MergeResult, TypeMismatchError, check_positive};
use crate::reducer::{Reducer, fold};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::trace;

/* ===================== Clocks ===================== */

/// Source of "now" for [`TimeWindow`].
pub trait Clock: Clone {
    fn now(&self) -> Instant;
}

/// `Instant::now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and advance
/// the clock inside a window it has moved elsewhere.
///
/// ```
/// use monofold::window::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// let t0 = clock.now();
/// handle.advance(Duration::from_secs(5));
/// assert_eq!(clock.now() - t0, Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Starts at the current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: Instant) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/* ===================== CountWindow ===================== */

/// The reducer over the last `capacity` values.
///
/// `update` appends and, once full, drops the oldest value. Merging appends
/// `other`'s retained values after this window's and trims back to capacity,
/// which matches replaying `other`'s stream after this one.
///
/// ```
/// use monofold::{window::CountWindow, Reducer, Sum};
///
/// let mut last3 = CountWindow::new(Sum::<i32>::new(), 3)?;
/// last3.update_all([1, 2, 3, 4, 5]);
/// assert_eq!(last3.result(), 12);
/// assert!(last3.is_full());
/// # Ok::<(), monofold::ConfigurationError>(())
/// ```
pub struct CountWindow<R: Reducer> {
    prototype: R,
    capacity: usize,
    values: VecDeque<R::Input>,
    cache: OnceLock<R>,
}

impl<R> CountWindow<R>
where
    R: Reducer,
    R::Input: Clone,
{
    const COMPONENT: &'static str = "CountWindow";

    /// A window over the `capacity` most recent values; `capacity` must be > 0.
    pub fn new(prototype: R, capacity: usize) -> Result<Self, ConfigurationError> {
        check_positive(Self::COMPONENT, "capacity", capacity)?;
        Ok(Self {
            prototype: prototype.identity(),
            capacity,
            values: VecDeque::with_capacity(capacity),
            cache: OnceLock::new(),
        })
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    /// Retained values, oldest first.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &R::Input> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.cache.take();
    }

    /// A copy of the reducer over the retained values.
    pub fn reducer(&self) -> R {
        self.cached().clone()
    }

    fn cached(&self) -> &R {
        self.cache
            .get_or_init(|| fold(&self.prototype, self.values.iter().cloned()))
    }

    fn trim(&mut self) {
        let excess = self.values.len().saturating_sub(self.capacity);
        if excess > 0 {
            trace!(evicted = excess, "count window evicted oldest values");
            self.values.drain(..excess);
        }
    }
}

impl<R> Clone for CountWindow<R>
where
    R: Reducer,
    R::Input: Clone,
{
    fn clone(&self) -> Self {
        Self {
            prototype: self.prototype.clone(),
            capacity: self.capacity,
            values: self.values.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R> std::fmt::Debug for CountWindow<R>
where
    R: Reducer,
    R::Input: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountWindow")
            .field("capacity", &self.capacity)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl<R> Reducer for CountWindow<R>
where
    R: Reducer,
    R::Input: Clone,
{
    type Input = R::Input;
    type Output = R::Output;

    fn identity(&self) -> Self {
        Self {
            prototype: self.prototype.clone(),
            capacity: self.capacity,
            values: VecDeque::with_capacity(self.capacity),
            cache: OnceLock::new(),
        }
    }

    fn update(&mut self, value: R::Input) -> &mut Self {
        self.values.push_back(value);
        self.trim();
        self.cache.take();
        self
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if self.capacity != other.capacity {
            return Err(TypeMismatchError::new(
                Self::COMPONENT,
                format!("capacity {}", self.capacity),
                format!("capacity {}", other.capacity),
            ));
        }
        if other.values.is_empty() {
            return Ok(());
        }
        self.values.extend(other.values.iter().cloned());
        self.trim();
        self.cache.take();
        Ok(())
    }

    fn result(&self) -> R::Output {
        self.cached().result()
    }
}

/* ===================== TimeWindow ===================== */

/// The reducer over values received within the last `duration`.
///
/// An entry stamped `t` is live while `t >= now - duration`. Expired entries
/// are dropped on every update and merge, and skipped on reads, so a window
/// that is only read never grows stale. Entries are kept sorted by
/// timestamp: [`update_at`](Self::update_at) with an out-of-order timestamp
/// is inserted in place, and merge interleaves both windows by timestamp.
///
/// ```
/// use monofold::{window::{ManualClock, TimeWindow}, Count, Reducer};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut w = TimeWindow::with_clock(Count::new(), Duration::from_secs(10), clock.clone())?;
/// w.update("a");
/// clock.advance(Duration::from_secs(6));
/// w.update("b");
/// assert_eq!(w.result(), 2);
/// clock.advance(Duration::from_secs(6));
/// assert_eq!(w.result(), 1);
/// # Ok::<(), monofold::ConfigurationError>(())
/// ```
pub struct TimeWindow<R: Reducer, C = MonotonicClock> {
    prototype: R,
    duration: Duration,
    clock: C,
    entries: VecDeque<(Instant, R::Input)>,
    // (index of the first live entry when computed, reducer over the rest)
    cache: Mutex<Option<(usize, R)>>,
}

impl<R> TimeWindow<R, MonotonicClock>
where
    R: Reducer,
    R::Input: Clone,
{
    /// A window over the last `duration` of wall time; `duration` must be > 0.
    pub fn new(prototype: R, duration: Duration) -> Result<Self, ConfigurationError> {
        Self::with_clock(prototype, duration, MonotonicClock)
    }

    /// Same as [`new`](Self::new) with the duration given in seconds.
    pub fn from_secs_f64(prototype: R, seconds: f64) -> Result<Self, ConfigurationError> {
        let duration = Duration::try_from_secs_f64(seconds).map_err(|e| {
            ConfigurationError::new(Self::COMPONENT, format!("invalid duration {seconds}s: {e}"))
        })?;
        Self::new(prototype, duration)
    }
}

impl<R, C> TimeWindow<R, C>
where
    R: Reducer,
    R::Input: Clone,
    C: Clock,
{
    const COMPONENT: &'static str = "TimeWindow";

    pub fn with_clock(prototype: R, duration: Duration, clock: C) -> Result<Self, ConfigurationError> {
        if duration.is_zero() {
            return Err(ConfigurationError::new(Self::COMPONENT, "duration must be > 0"));
        }
        Ok(Self {
            prototype: prototype.identity(),
            duration,
            clock,
            entries: VecDeque::new(),
            cache: Mutex::new(None),
        })
    }

    pub const fn duration(&self) -> Duration {
        self.duration
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert `value` stamped `at`.
    pub fn update_at(&mut self, value: R::Input, at: Instant) -> &mut Self {
        let pos = self.entries.partition_point(|(t, _)| *t <= at);
        self.entries.insert(pos, (at, value));
        self.expire();
        self.invalidate();
        self
    }

    /// Drop every entry that is no longer live.
    pub fn expire(&mut self) {
        let start = self.first_live();
        if start > 0 {
            trace!(evicted = start, "time window evicted expired entries");
            self.entries.drain(..start);
            self.invalidate();
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.first_live()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.invalidate();
    }

    /// A copy of the reducer over the live entries.
    pub fn reducer(&self) -> R {
        let start = self.first_live();
        let mut cache = self.cache.lock();
        if let Some((cached_start, r)) = cache.as_ref()
            && *cached_start == start
        {
            return r.clone();
        }
        let r = fold(
            &self.prototype,
            self.entries.iter().skip(start).map(|(_, v)| v.clone()),
        );
        *cache = Some((start, r.clone()));
        r
    }

    fn first_live(&self) -> usize {
        match self.clock.now().checked_sub(self.duration) {
            Some(cutoff) => self.entries.partition_point(|(t, _)| *t < cutoff),
            None => 0,
        }
    }

    fn invalidate(&mut self) {
        *self.cache.get_mut() = None;
    }
}

impl<R, C> Clone for TimeWindow<R, C>
where
    R: Reducer,
    R::Input: Clone,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            prototype: self.prototype.clone(),
            duration: self.duration,
            clock: self.clock.clone(),
            entries: self.entries.clone(),
            cache: Mutex::new(self.cache.lock().clone()),
        }
    }
}

impl<R, C> std::fmt::Debug for TimeWindow<R, C>
where
    R: Reducer,
    R::Input: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeWindow")
            .field("duration", &self.duration)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl<R, C> Reducer for TimeWindow<R, C>
where
    R: Reducer,
    R::Input: Clone,
    C: Clock,
{
    type Input = R::Input;
    type Output = R::Output;

    fn identity(&self) -> Self {
        Self {
            prototype: self.prototype.clone(),
            duration: self.duration,
            clock: self.clock.clone(),
            entries: VecDeque::new(),
            cache: Mutex::new(None),
        }
    }

    fn update(&mut self, value: R::Input) -> &mut Self {
        let now = self.clock.now();
        self.update_at(value, now)
    }

    fn merge(&mut self, other: &Self) -> MergeResult {
        if self.duration != other.duration {
            return Err(TypeMismatchError::new(
                Self::COMPONENT,
                format!("{:?} window", self.duration),
                format!("{:?} window", other.duration),
            ));
        }
        if other.entries.is_empty() {
            return Ok(());
        }
        let mut merged = VecDeque::with_capacity(self.entries.len() + other.entries.len());
        let mut mine = std::mem::take(&mut self.entries).into_iter().peekable();
        let mut theirs = other.entries.iter().cloned().peekable();
        loop {
            let take_mine = match (mine.peek(), theirs.peek()) {
                (Some((a, _)), Some((b, _))) => a <= b,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_mine { mine.next() } else { theirs.next() };
            merged.extend(next);
        }
        self.entries = merged;
        self.expire();
        self.invalidate();
        Ok(())
    }

    fn result(&self) -> R::Output {
        self.reducer().result()
    }
}
