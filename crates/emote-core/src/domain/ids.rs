//! Participant identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ReactionError;

/// Opaque identity of one participant in the session.
///
/// Always non-empty. The inner value is whatever the media service uses as a
/// peer id; this crate never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Rejects an empty id.
    pub fn parse(s: impl Into<String>) -> Result<Self, ReactionError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ReactionError::EmptyParticipantId);
        }
        Ok(Self(s))
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ReactionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert_eq!(
            ParticipantId::parse(""),
            Err(ReactionError::EmptyParticipantId)
        );
    }

    #[test]
    fn keeps_value_verbatim() {
        let id = ParticipantId::parse("peer-A ").unwrap();
        assert_eq!(id.as_str(), "peer-A ");
        assert_eq!(id.to_string(), "peer-A ");
    }

    #[test]
    fn deserialize_validates() {
        let id: ParticipantId = serde_json::from_str("\"peerA\"").unwrap();
        assert_eq!(id.as_str(), "peerA");
        assert!(serde_json::from_str::<ParticipantId>("\"\"").is_err());
    }
}
