//! Ports - abstractions over the world outside the reaction subsystem.
//!
//! - **Clock**: wall-clock time for acceptance stamps
//! - **MediaService**: transport collaborator (outbound send, inbound notifications)

pub mod clock;
pub mod media_service;

pub use self::clock::{Clock, FixedClock, RuntimeClock, SystemClock};
pub use self::media_service::{InboundReaction, MediaError, MediaService};
