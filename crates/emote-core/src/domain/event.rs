//! ReactionEvent: one accepted reaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use super::{ParticipantId, ReactionKind};

/// A reaction as accepted into the store.
///
/// `observed_at` is stamped by the store at acceptance time, never taken from
/// the sender, so expiry does not depend on network delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionEvent {
    participant_id: ParticipantId,
    kind: ReactionKind,
    observed_at: DateTime<Utc>,
}

impl ReactionEvent {
    /// Reaction by `participant_id`, stamped `observed_at`.
    pub fn new(participant_id: ParticipantId, kind: ReactionKind, observed_at: DateTime<Utc>) -> Self {
        Self {
            participant_id,
            kind,
            observed_at,
        }
    }

    /// Who reacted.
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// Which reaction.
    pub fn kind(&self) -> ReactionKind {
        self.kind
    }

    /// When the reaction was accepted.
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// How long the reaction has been visible at `now`.
    ///
    /// A clock that went backwards yields zero rather than a negative age.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.observed_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Visible time left under `ttl`, or `None` once the reaction is due.
    pub fn remaining(&self, now: DateTime<Utc>, ttl: Duration) -> Option<Duration> {
        ttl.checked_sub(self.age(now)).filter(|left| !left.is_zero())
    }

    /// Aged `ttl` or more.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.remaining(now, ttl).is_none()
    }
}
