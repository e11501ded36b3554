//! Domain model (kinds, participant ids, events, changes, errors).

pub mod change;
pub mod errors;
pub mod event;
pub mod ids;
pub mod kind;

pub use self::change::ReactionChange;
pub use self::errors::ReactionError;
pub use self::event::ReactionEvent;
pub use self::ids::ParticipantId;
pub use self::kind::ReactionKind;
