//! Store entry: the visible reaction plus the timer that will retract it.

use super::expiry::ExpiryTimer;
use crate::domain::ReactionEvent;

/// One participant's slot in the store.
///
/// Design:
/// - The entry owns its retraction timer, so replacing or removing the entry
///   cancels the timer with it.
/// - `generation` identifies this acceptance. A timer only retracts the entry
///   it was armed for, even if it wakes after being superseded.
#[derive(Debug)]
pub(crate) struct ReactionEntry {
    pub event: ReactionEvent,
    pub generation: u64,
    timer: Option<ExpiryTimer>,
}

impl ReactionEntry {
    pub fn new(event: ReactionEvent, generation: u64, timer: ExpiryTimer) -> Self {
        Self {
            event,
            generation,
            timer: Some(timer),
        }
    }

    /// Swap in a new timer; the previous one is cancelled.
    pub fn rearm(&mut self, timer: ExpiryTimer) {
        self.timer = Some(timer);
    }

    /// Consume an entry retracted by its own timer task.
    ///
    /// The running task must not abort itself, so its handle is released
    /// instead of cancelled.
    pub fn into_expired(mut self) -> ReactionEvent {
        if let Some(timer) = self.timer.take() {
            timer.detach();
        }
        self.event
    }
}
