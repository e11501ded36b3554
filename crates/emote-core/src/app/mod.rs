//! App - wiring between the store and the outside world.
//!
//! - **ReactionBridge**: local reactions out, remote reactions in

pub mod bridge;

pub use self::bridge::{DropReason, ReactOutcome, ReactionBridge};
