//! Domain errors.

use thiserror::Error;

/// Validation failures for inputs that cross the subsystem boundary.
///
/// None of these are fatal: callers log them and drop the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionError {
    #[error("unknown reaction kind '{0}'")]
    UnknownKind(String),

    #[error("participant id must not be empty")]
    EmptyParticipantId,
}
