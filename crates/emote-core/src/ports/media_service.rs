//! MediaService port - the real-time transport collaborator.
//!
//! The media service delivers reactions between clients. This crate only
//! calls `send_reaction` and listens for inbound notifications; delivery,
//! ordering and retransmission are the service's business.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::ReactionKind;

/// "Reaction received" notification as it comes off the wire.
///
/// Fields are raw strings: validation happens in the bridge, which drops
/// anything it cannot parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReaction {
    pub participant_id: String,
    pub kind: String,
}

impl InboundReaction {
    pub fn new(participant_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            kind: kind.into(),
        }
    }
}

/// Transport-level failure reported by the media service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("media service is not connected")]
    NotConnected,
}

/// MediaService is the boundary with the transport.
///
/// # Contract
/// - `send_reaction` is fire-and-forget; callers never retry.
/// - `subscribe_reactions` registers one listener. Each call adds another
///   listener, so callers subscribe exactly once per session.
/// - Inbound delivery is at-least-once with no ordering or dedup guarantee.
#[async_trait]
pub trait MediaService: Send + Sync {
    async fn send_reaction(&self, kind: ReactionKind) -> Result<(), MediaError>;

    fn subscribe_reactions(&self) -> mpsc::UnboundedReceiver<InboundReaction>;
}
