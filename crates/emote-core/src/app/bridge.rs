//! ReactionBridge - the only way reactions get into (or out of) the session.
//!
//! # Flow
//! - Outbound: user picks a kind -> store it for self right away -> forward to
//!   the media service. The local tile never waits on the network.
//! - Inbound: one listener, registered in `new`, applies every "reaction
//!   received" notification to the store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{ParticipantId, ReactionEvent, ReactionKind};
use crate::ports::{InboundReaction, MediaService};
use crate::store::ReactionStore;

/// Why a local reaction was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Not one of the known reaction kinds.
    UnknownKind(String),
    /// The session has not been joined yet, so there is no self id.
    NotJoined,
}

/// Result of a local reaction. Drops are not errors: nothing is surfaced to
/// the user and nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactOutcome {
    Applied(ReactionEvent),
    Dropped(DropReason),
}

/// Connects the store to the media service for one session.
///
/// Both collaborators are injected; nothing is looked up globally. The
/// inbound subscription lives exactly as long as the bridge.
pub struct ReactionBridge {
    store: ReactionStore,
    media: Arc<dyn MediaService>,
    local: RwLock<Option<ParticipantId>>,
    listener: JoinHandle<()>,
}

impl ReactionBridge {
    /// Wire the bridge and subscribe to inbound reactions (once).
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: ReactionStore, media: Arc<dyn MediaService>) -> Self {
        let inbound = media.subscribe_reactions();
        let listener = tokio::spawn(listen(store.clone(), inbound));
        info!("reaction bridge started");
        Self {
            store,
            media,
            local: RwLock::new(None),
            listener,
        }
    }

    /// Read handle for display surfaces.
    pub fn store(&self) -> &ReactionStore {
        &self.store
    }

    /// Record our own participant id once the session is joined.
    pub async fn join(&self, local: ParticipantId) {
        info!(participant = %local, "local participant joined");
        *self.local.write().await = Some(local);
    }

    /// Forget our own id and retract our own reaction.
    pub async fn leave(&self) -> Option<ParticipantId> {
        let local = self.local.write().await.take();
        if let Some(participant) = &local {
            info!(%participant, "local participant left");
            self.store.clear_reaction(participant).await;
        }
        local
    }

    /// Our own id, once joined.
    pub async fn local_participant(&self) -> Option<ParticipantId> {
        self.local.read().await.clone()
    }

    /// The user picked a reaction, as a wire id straight from the UI.
    pub async fn react(&self, kind: &str) -> ReactOutcome {
        match kind.parse::<ReactionKind>() {
            Ok(kind) => self.react_kind(kind).await,
            Err(err) => {
                warn!(%err, "dropping local reaction");
                ReactOutcome::Dropped(DropReason::UnknownKind(kind.to_string()))
            }
        }
    }

    /// Apply a reaction locally, then send it to the other participants.
    ///
    /// A failed send is logged; the local reaction stays.
    pub async fn react_kind(&self, kind: ReactionKind) -> ReactOutcome {
        let Some(local) = self.local_participant().await else {
            debug!(%kind, "not joined yet, dropping local reaction");
            return ReactOutcome::Dropped(DropReason::NotJoined);
        };

        let event = self.store.set_reaction(&local, kind).await;

        // fire-and-forget: the local reaction stands even if the send fails
        if let Err(err) = self.media.send_reaction(kind).await {
            warn!(%kind, %err, "failed to send reaction");
        }
        ReactOutcome::Applied(event)
    }

    /// A remote participant left the session.
    pub async fn participant_left(&self, participant: &ParticipantId) {
        self.store.clear_reaction(participant).await;
    }

    /// Session teardown: stop listening and drop every reaction.
    pub async fn shutdown(self) {
        self.listener.abort();
        self.store.clear_all().await;
        info!("reaction bridge shut down");
    }
}

impl Drop for ReactionBridge {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn listen(store: ReactionStore, mut inbound: UnboundedReceiver<InboundReaction>) {
    while let Some(reaction) = inbound.recv().await {
        apply_inbound(&store, reaction).await;
    }
    debug!("inbound reaction stream closed");
}

async fn apply_inbound(store: &ReactionStore, reaction: InboundReaction) {
    let InboundReaction {
        participant_id,
        kind,
    } = reaction;

    let participant = match ParticipantId::parse(participant_id) {
        Ok(participant) => participant,
        Err(err) => {
            warn!(%err, %kind, "dropping inbound reaction");
            return;
        }
    };
    let kind = match kind.parse::<ReactionKind>() {
        Ok(kind) => kind,
        Err(err) => {
            warn!(%participant, %err, "dropping inbound reaction");
            return;
        }
    };

    debug!(%participant, %kind, "reaction event received");
    store.set_reaction(&participant, kind).await;
}
