//! Expiry scheduling: when a reaction is due, and the timer that retracts it.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::ReactionEvent;
use crate::ports::Clock;

/// What to do with a reaction given its age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPlan {
    /// Already at or past TTL: retract now.
    Immediate,
    /// Retract after the remaining visible time.
    After(Duration),
}

/// Decides expiry deadlines and arms retraction timers.
///
/// Design:
/// - `plan` is pure: `remaining = ttl - (now - observed_at)`.
/// - `arm` spawns one sleeping task per call; the returned `ExpiryTimer` owns
///   it. Whoever holds the timer decides its lifetime.
#[derive(Clone)]
pub struct ExpiryScheduler {
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ExpiryScheduler {
    /// Scheduler retracting after `ttl`, measured on `clock`.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { ttl, clock }
    }

    /// Visible lifetime of a reaction.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current time on the scheduler's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Re-read the clock's wall source (after suspend).
    pub fn resync_clock(&self) {
        self.clock.resync();
    }

    /// Remaining visible time of `event`, or `Immediate` once it is due.
    pub fn plan(&self, event: &ReactionEvent) -> ExpiryPlan {
        match event.remaining(self.clock.now(), self.ttl) {
            Some(left) => ExpiryPlan::After(left),
            None => ExpiryPlan::Immediate,
        }
    }

    /// Run `on_due` after `delay` unless the returned timer is dropped first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&self, delay: Duration, on_due: F) -> ExpiryTimer
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_due.await;
        });
        ExpiryTimer {
            handle: Some(handle),
        }
    }
}

/// A pending retraction. Dropping it cancels the retraction.
///
/// Cancelling a timer that already fired is a no-op.
#[derive(Debug)]
pub struct ExpiryTimer {
    handle: Option<JoinHandle<()>>,
}

impl ExpiryTimer {
    /// Cancel the retraction. Same as dropping the timer.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the timer task has run to completion (or was never armed).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Release the task without aborting it. Used by the timer's own task
    /// when it removes the entry that owns it.
    pub(crate) fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
