//! emote-core
//!
//! Ephemeral reactions for a multi-party call: each participant can show one
//! short-lived reaction (thumbs-up, clap, ...) that every client displays and
//! then retracts on its own.
//!
//! # Modules
//! - **domain**: reaction kinds, participant ids, events, change notifications
//! - **ports**: Clock and MediaService abstractions
//! - **store**: ReactionStore with per-entry expiry timers
//! - **app**: ReactionBridge (local reactions out, remote reactions in)
//! - **impls**: InMemoryMediaService for development
//! - **config**: ReactionConfig
//! - **observability**: ReactionCounts

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod store;

pub use app::{DropReason, ReactOutcome, ReactionBridge};
pub use config::{ConfigError, ReactionConfig};
pub use domain::{ParticipantId, ReactionChange, ReactionError, ReactionEvent, ReactionKind};
pub use store::ReactionStore;
