//! InMemoryMediaService - media service stand-in for development and tests.
//!
//! # Behaviour
//! - `send_reaction` records the kind (or fails, when told to)
//! - `subscribe_reactions` hands out a channel per call and counts the calls
//! - `deliver` plays the network: pushes one notification to every live listener

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::ReactionKind;
use crate::ports::{InboundReaction, MediaError, MediaService};

#[derive(Debug, Default)]
pub struct InMemoryMediaService {
    listeners: Mutex<Vec<mpsc::UnboundedSender<InboundReaction>>>,
    sent: Mutex<Vec<ReactionKind>>,
    subscriptions: AtomicUsize,
    fail_sends: AtomicBool,
}

impl InMemoryMediaService {
    /// Connected service with no listeners yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a remote reaction to every live listener.
    ///
    /// Returns how many listeners received it; closed ones are pruned.
    pub fn deliver(&self, participant_id: &str, kind: &str) -> usize {
        let reaction = InboundReaction::new(participant_id, kind);
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|listener| listener.send(reaction.clone()).is_ok());
        listeners.len()
    }

    /// Kinds successfully sent so far, oldest first.
    pub fn sent(&self) -> Vec<ReactionKind> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `subscribe_reactions` calls.
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Make subsequent sends fail with `MediaError::NotConnected`.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaService for InMemoryMediaService {
    async fn send_reaction(&self, kind: ReactionKind) -> Result<(), MediaError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MediaError::NotConnected);
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(kind);
        Ok(())
    }

    fn subscribe_reactions(&self) -> mpsc::UnboundedReceiver<InboundReaction> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        rx
    }
}
