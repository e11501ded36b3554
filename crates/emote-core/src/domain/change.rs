//! Store change notifications.

use serde::Serialize;

use super::{ParticipantId, ReactionEvent};

/// What happened to the store, published to subscribers after each mutation.
///
/// Display surfaces re-render from these; they never own timers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactionChange {
    /// A reaction was accepted (new or replacing an older one).
    Set(ReactionEvent),
    /// Explicitly removed, e.g. the participant left.
    Cleared { participant_id: ParticipantId },
    /// Retracted because it reached its TTL.
    Expired { participant_id: ParticipantId },
    /// Whole store emptied on session reset.
    ClearedAll,
}

impl ReactionChange {
    /// Participant the change is about, `None` for `ClearedAll`.
    pub fn participant(&self) -> Option<&ParticipantId> {
        match self {
            ReactionChange::Set(event) => Some(event.participant_id()),
            ReactionChange::Cleared { participant_id }
            | ReactionChange::Expired { participant_id } => Some(participant_id),
            ReactionChange::ClearedAll => None,
        }
    }
}
