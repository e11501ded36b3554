//! Clock port - wall-clock time source.
//!
//! Reaction timestamps are wall-clock instants, but retraction deadlines are
//! driven by tokio's monotonic timer. `RuntimeClock` ties the two together and
//! is what the store uses unless told otherwise.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Clock supplies "now" for acceptance stamps and age checks.
///
/// # Thread Safety
/// - `Send + Sync` so one clock can be shared by the store and its timers.
pub trait Clock: Send + Sync {
    /// Current wall-clock instant.
    fn now(&self) -> DateTime<Utc>;

    /// Re-read whatever external time source backs the clock.
    ///
    /// Called after the host resumes from suspend. No-op by default.
    fn resync(&self) {}
}

/// Plain `Utc::now()`. Subject to wall-clock jumps (NTP, suspend).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    wall: DateTime<Utc>,
    mono: tokio::time::Instant,
}

/// Wall-clock anchor advanced by tokio's monotonic clock.
///
/// Under a paused test runtime this advances exactly with
/// `tokio::time::advance`, so stamps and timer deadlines never drift apart.
///
/// # Suspend
/// The monotonic clock stops while the host sleeps, so `now` falls behind
/// the wall source across a suspend. `resync` re-anchors on the wall source
/// and the lost time shows up again.
pub struct RuntimeClock {
    wall: Arc<dyn Clock>,
    anchor: RwLock<Anchor>,
}

impl RuntimeClock {
    /// Anchored on `SystemClock`.
    pub fn new() -> Self {
        Self::with_wall(Arc::new(SystemClock))
    }

    /// Anchored on an arbitrary wall source (a `FixedClock` in tests).
    pub fn with_wall(wall: Arc<dyn Clock>) -> Self {
        let anchor = Anchor {
            wall: wall.now(),
            mono: tokio::time::Instant::now(),
        };
        Self {
            wall,
            anchor: RwLock::new(anchor),
        }
    }
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RuntimeClock {
    fn now(&self) -> DateTime<Utc> {
        let anchor = *self.anchor.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        saturating_add(anchor.wall, anchor.mono.elapsed())
    }

    fn resync(&self) {
        let fresh = Anchor {
            wall: self.wall.now(),
            mono: tokio::time::Instant::now(),
        };
        *self.anchor.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = fresh;
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Jump to `now`, forwards or backwards.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = saturating_add(*now, by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn saturating_add(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
