//! Reaction store: participant -> current reaction, with automatic retraction.

mod entry;
pub mod expiry;

pub use expiry::{ExpiryPlan, ExpiryScheduler, ExpiryTimer};

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tracing::debug;

use self::entry::ReactionEntry;
use crate::config::{ConfigError, ReactionConfig};
use crate::domain::{ParticipantId, ReactionChange, ReactionEvent, ReactionKind};
use crate::observability::ReactionCounts;
use crate::ports::{Clock, RuntimeClock};

struct StoreState {
    entries: HashMap<ParticipantId, ReactionEntry>,

    /// Next acceptance generation to assign.
    next_generation: u64,
}

impl StoreState {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 1,
        }
    }

    fn allocate_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }
}

struct StoreInner {
    state: Mutex<StoreState>,
    scheduler: ExpiryScheduler,
    changes: broadcast::Sender<ReactionChange>,
}

impl StoreInner {
    fn publish(&self, change: ReactionChange) {
        // no subscribers is fine
        let _ = self.changes.send(change);
    }

    /// Timer callback: retract `participant` if it still holds `generation`.
    async fn expire(&self, participant: &ParticipantId, generation: u64) {
        let mut state = self.state.lock().await;
        let current = state
            .entries
            .get(participant)
            .is_some_and(|entry| entry.generation == generation);
        if !current {
            debug!(%participant, generation, "stale expiry ignored");
            return;
        }
        if let Some(entry) = state.entries.remove(participant) {
            let event = entry.into_expired();
            debug!(%participant, kind = %event.kind(), "reaction expired");
            drop(state);
            self.publish(ReactionChange::Expired {
                participant_id: participant.clone(),
            });
        }
    }
}

/// Shared reaction state for one session.
///
/// Cheap to clone; every clone is a handle to the same store.
///
/// Design:
/// - At most one reaction per participant. A newer one replaces the older.
/// - Every entry owns exactly one retraction timer, armed on accept and
///   cancelled on replace/clear. Readers never arm timers.
/// - Readers never see an entry aged >= TTL, even if its timer is late.
/// - Only the bridge and the store's own timers should write.
#[derive(Clone)]
pub struct ReactionStore {
    inner: Arc<StoreInner>,
}

impl ReactionStore {
    /// Store driven by `RuntimeClock`. Rejects an invalid config.
    pub fn new(config: &ReactionConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(RuntimeClock::new()))
    }

    /// Store reading time from `clock`. Rejects an invalid config.
    pub fn with_clock(config: &ReactionConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let (changes, _) = broadcast::channel(config.feed_capacity);
        Ok(Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState::new()),
                scheduler: ExpiryScheduler::new(config.ttl(), clock),
                changes,
            }),
        })
    }

    /// Visible lifetime of a reaction.
    pub fn ttl(&self) -> Duration {
        self.inner.scheduler.ttl()
    }

    /// Subscribe to changes made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ReactionChange> {
        self.inner.changes.subscribe()
    }

    /// Accept a reaction for `participant`, stamped now.
    ///
    /// Replaces any previous reaction (and its pending retraction). Setting
    /// the same kind again refreshes the stamp.
    pub async fn set_reaction(&self, participant: &ParticipantId, kind: ReactionKind) -> ReactionEvent {
        let mut state = self.inner.state.lock().await;
        let event = ReactionEvent::new(participant.clone(), kind, self.inner.scheduler.now());
        let generation = state.allocate_generation();

        // ttl is validated non-zero, so a fresh event always has time left
        let delay = match self.inner.scheduler.plan(&event) {
            ExpiryPlan::After(delay) => delay,
            ExpiryPlan::Immediate => Duration::ZERO,
        };
        let timer = self.arm(participant, generation, delay);
        state
            .entries
            .insert(participant.clone(), ReactionEntry::new(event.clone(), generation, timer));
        drop(state);
        debug!(%participant, %kind, generation, ?delay, "reaction set");
        self.inner.publish(ReactionChange::Set(event.clone()));
        event
    }

    /// Remove `participant`'s reaction. No-op when there is none.
    pub async fn clear_reaction(&self, participant: &ParticipantId) {
        let removed = self.inner.state.lock().await.entries.remove(participant);
        if removed.is_some() {
            debug!(%participant, "reaction cleared");
            self.inner.publish(ReactionChange::Cleared {
                participant_id: participant.clone(),
            });
        }
    }

    /// Empty the store, cancelling every pending retraction.
    pub async fn clear_all(&self) {
        let removed = {
            let mut state = self.inner.state.lock().await;
            std::mem::take(&mut state.entries)
        };
        if !removed.is_empty() {
            debug!(count = removed.len(), "all reactions cleared");
            drop(removed);
            self.inner.publish(ReactionChange::ClearedAll);
        }
    }

    /// Current reaction for `participant`, if still visible.
    pub async fn get_reaction(&self, participant: &ParticipantId) -> Option<ReactionEvent> {
        self.active_for(participant).await.map(|(event, _)| event)
    }

    /// Current reaction and how long it has been visible.
    pub async fn active_for(&self, participant: &ParticipantId) -> Option<(ReactionEvent, Duration)> {
        let state = self.inner.state.lock().await;
        let now = self.inner.scheduler.now();
        let ttl = self.ttl();
        state
            .entries
            .get(participant)
            .filter(|entry| !entry.event.is_expired(now, ttl))
            .map(|entry| (entry.event.clone(), entry.event.age(now)))
    }

    /// Every visible reaction, ordered by participant id.
    pub async fn snapshot(&self) -> Vec<ReactionEvent> {
        let state = self.inner.state.lock().await;
        let now = self.inner.scheduler.now();
        let ttl = self.ttl();
        let mut visible: Vec<ReactionEvent> = state
            .entries
            .values()
            .filter(|entry| !entry.event.is_expired(now, ttl))
            .map(|entry| entry.event.clone())
            .collect();
        visible.sort_by(|a, b| a.participant_id().cmp(b.participant_id()));
        visible
    }

    /// Visible reactions tallied by kind.
    pub async fn counts(&self) -> ReactionCounts {
        let mut counts = ReactionCounts::default();
        for event in self.snapshot().await {
            counts.record(event.kind());
        }
        counts
    }

    /// Re-evaluate every entry against the clock.
    ///
    /// Entries at or past TTL are retracted now; the rest get a fresh timer
    /// for their remaining time. Use after the host resumes from suspend,
    /// when the wall clock may have jumped past pending deadlines.
    pub async fn resync(&self) {
        self.inner.scheduler.resync_clock();
        let mut state = self.inner.state.lock().await;
        let mut due = Vec::new();
        for (participant, entry) in state.entries.iter_mut() {
            match self.inner.scheduler.plan(&entry.event) {
                ExpiryPlan::Immediate => due.push(participant.clone()),
                ExpiryPlan::After(delay) => {
                    entry.rearm(self.arm(participant, entry.generation, delay));
                }
            }
        }
        for participant in &due {
            state.entries.remove(participant);
        }
        drop(state);

        debug!(expired = due.len(), "reactions resynced");
        for participant in due {
            self.inner.publish(ReactionChange::Expired {
                participant_id: participant,
            });
        }
    }

    fn arm(&self, participant: &ParticipantId, generation: u64, delay: Duration) -> ExpiryTimer {
        let store: Weak<StoreInner> = Arc::downgrade(&self.inner);
        let participant = participant.clone();
        self.inner.scheduler.arm(delay, async move {
            if let Some(inner) = store.upgrade() {
                inner.expire(&participant, generation).await;
            }
        })
    }

    /// Raw entry count including anything overdue (for testing)
    #[cfg(test)]
    async fn stored_len(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    fn peer(id: &str) -> ParticipantId {
        ParticipantId::parse(id).unwrap()
    }

    fn store() -> ReactionStore {
        ReactionStore::new(&ReactionConfig::default()).unwrap()
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn set_then_get_returns_kind_and_fresh_stamp() {
        let clock = Arc::new(RuntimeClock::new());
        let store = ReactionStore::with_clock(&ReactionConfig::default(), clock.clone()).unwrap();
        let peer_a = peer("peerA");

        let before = clock.now();
        store.set_reaction(&peer_a, ReactionKind::Clap).await;
        let after = clock.now();

        let event = store.get_reaction(&peer_a).await.unwrap();
        assert_eq!(event.kind(), ReactionKind::Clap);
        assert_eq!(event.participant_id(), &peer_a);
        assert!(before <= event.observed_at() && event.observed_at() <= after);
    }

    #[tokio::test(start_paused = true)]
    async fn one_entry_per_participant() {
        let store = store();
        let peer_a = peer("peerA");

        store.set_reaction(&peer_a, ReactionKind::Clap).await;
        store.set_reaction(&peer_a, ReactionKind::Party).await;
        store.set_reaction(&peer_a, ReactionKind::Smile).await;

        assert_eq!(store.stored_len().await, 1);
        assert_eq!(
            store.get_reaction(&peer_a).await.map(|e| e.kind()),
            Some(ReactionKind::Smile)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timer_removes_entry_after_ttl() {
        let store = store();
        let peer_a = peer("peerA");
        store.set_reaction(&peer_a, ReactionKind::Clap).await;

        tokio::time::sleep(Duration::from_millis(9_999)).await;
        assert_eq!(store.stored_len().await, 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(store.stored_len().await, 0);
        assert!(store.get_reaction(&peer_a).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn same_kind_again_refreshes_stamp_and_timer() {
        let store = store();
        let peer_a = peer("peerA");
        let first = store.set_reaction(&peer_a, ReactionKind::Clap).await;

        tokio::time::sleep(Duration::from_millis(6_000)).await;
        let second = store.set_reaction(&peer_a, ReactionKind::Clap).await;
        assert!(second.observed_at() > first.observed_at());

        // past the first deadline, inside the second
        tokio::time::sleep(Duration::from_millis(6_000)).await;
        settle().await;
        assert_eq!(store.stored_len().await, 1);
        assert_eq!(store.get_reaction(&peer_a).await, Some(second));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_absent_participant_is_noop() {
        let store = store();
        let peer_a = peer("peerA");
        let peer_b = peer("peerB");
        store.set_reaction(&peer_a, ReactionKind::Smile).await;
        let mut changes = store.subscribe();

        store.clear_reaction(&peer_b).await;

        assert_eq!(store.snapshot().await.len(), 1);
        assert!(matches!(
            changes.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_pending_expiry() {
        let store = store();
        let peer_a = peer("peerA");
        store.set_reaction(&peer_a, ReactionKind::Smile).await;
        let mut changes = store.subscribe();

        store.clear_reaction(&peer_a).await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(
            changes.try_recv().unwrap(),
            ReactionChange::Cleared {
                participant_id: peer_a.clone()
            }
        );
        // no Expired from the cancelled timer
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_all_empties_and_cancels() {
        let store = store();
        for id in ["a", "b", "c"] {
            store.set_reaction(&peer(id), ReactionKind::ThumbUp).await;
        }
        let mut changes = store.subscribe();

        store.clear_all().await;
        assert!(store.snapshot().await.is_empty());
        assert_eq!(changes.try_recv().unwrap(), ReactionChange::ClearedAll);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(changes.try_recv().is_err());

        // empty store: nothing to announce
        store.clear_all().await;
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn readers_never_see_overdue_entry() {
        // FixedClock races ahead of tokio time, so the timer has not fired yet
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(t0));
        let store = ReactionStore::with_clock(&ReactionConfig::default(), clock.clone()).unwrap();
        let peer_a = peer("peerA");
        store.set_reaction(&peer_a, ReactionKind::Party).await;

        clock.advance(Duration::from_millis(10_000));

        assert_eq!(store.stored_len().await, 1);
        assert!(store.get_reaction(&peer_a).await.is_none());
        assert!(store.active_for(&peer_a).await.is_none());
        assert!(store.snapshot().await.is_empty());
        assert_eq!(store.counts().await.total(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn active_for_reports_age() {
        let store = store();
        let peer_a = peer("peerA");
        store.set_reaction(&peer_a, ReactionKind::ThumbDown).await;

        tokio::time::advance(Duration::from_millis(4_000)).await;

        let (event, age) = store.active_for(&peer_a).await.unwrap();
        assert_eq!(event.kind(), ReactionKind::ThumbDown);
        assert_eq!(age, Duration::from_millis(4_000));
    }

    #[tokio::test(start_paused = true)]
    async fn resync_retracts_overdue_and_rearms_the_rest() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(t0));
        let store = ReactionStore::with_clock(&ReactionConfig::default(), clock.clone()).unwrap();
        let old = peer("old");
        let fresh = peer("fresh");

        store.set_reaction(&old, ReactionKind::Clap).await;
        clock.advance(Duration::from_millis(6_000));
        store.set_reaction(&fresh, ReactionKind::Smile).await;

        // wall clock jumps 5s while tokio time stands still
        clock.advance(Duration::from_millis(5_000));
        let mut changes = store.subscribe();
        store.resync().await;

        assert_eq!(
            changes.try_recv().unwrap(),
            ReactionChange::Expired {
                participant_id: old.clone()
            }
        );
        assert_eq!(store.stored_len().await, 1);

        // fresh has 5s left: its rearmed timer fires then, not at the original 10s
        tokio::time::sleep(Duration::from_millis(4_999)).await;
        settle().await;
        assert_eq!(store.stored_len().await, 1);
        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(store.stored_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resync_catches_up_after_host_suspend() {
        // RuntimeClock counts tokio time only; the wall source keeps moving while suspended
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let wall = Arc::new(FixedClock::new(t0));
        let clock = Arc::new(RuntimeClock::with_wall(wall.clone()));
        let store = ReactionStore::with_clock(&ReactionConfig::default(), clock).unwrap();
        let peer_a = peer("peerA");
        store.set_reaction(&peer_a, ReactionKind::Party).await;

        tokio::time::advance(Duration::from_millis(2_000)).await;
        wall.advance(Duration::from_secs(3_600));
        assert!(store.get_reaction(&peer_a).await.is_some());

        let mut changes = store.subscribe();
        store.resync().await;

        assert_eq!(
            changes.try_recv().unwrap(),
            ReactionChange::Expired {
                participant_id: peer_a.clone()
            }
        );
        assert_eq!(store.stored_len().await, 0);
        assert!(store.get_reaction(&peer_a).await.is_none());
    }

    #[rstest::rstest]
    #[case::zero_ttl(ReactionConfig { ttl_ms: 0, ..ReactionConfig::default() })]
    #[case::zero_capacity(ReactionConfig { feed_capacity: 0, ..ReactionConfig::default() })]
    #[tokio::test(start_paused = true)]
    async fn invalid_config_is_rejected(#[case] config: ReactionConfig) {
        assert!(matches!(ReactionStore::new(&config), Err(ConfigError::Invalid(_))));
        let clock = Arc::new(RuntimeClock::new());
        assert!(matches!(
            ReactionStore::with_clock(&config, clock),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn counts_by_kind() {
        let store = store();
        store.set_reaction(&peer("a"), ReactionKind::Clap).await;
        store.set_reaction(&peer("b"), ReactionKind::Clap).await;
        store.set_reaction(&peer("c"), ReactionKind::Party).await;

        let counts = store.counts().await;
        assert_eq!(counts.clap, 2);
        assert_eq!(counts.party, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_last_handle_cancels_timers() {
        let store = store();
        let mut changes = store.subscribe();
        store.set_reaction(&peer("a"), ReactionKind::Clap).await;
        assert!(matches!(changes.try_recv(), Ok(ReactionChange::Set(_))));

        drop(store);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(matches!(
            changes.try_recv(),
            Err(broadcast::error::TryRecvError::Closed)
        ));
    }
}
