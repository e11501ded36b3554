//! Reaction kinds: the closed vocabulary shared with the media service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ReactionError;

/// A reaction a participant can broadcast.
///
/// The wire id (`as_str`) is shared verbatim with the media service encoding,
/// so variants must never be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    ThumbUp,
    ThumbDown,
    Clap,
    Party,
    Smile,
}

impl ReactionKind {
    /// Every kind, in menu order.
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::ThumbUp,
        ReactionKind::ThumbDown,
        ReactionKind::Clap,
        ReactionKind::Party,
        ReactionKind::Smile,
    ];

    /// Wire id.
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::ThumbUp => "thumbup",
            ReactionKind::ThumbDown => "thumbdown",
            ReactionKind::Clap => "clap",
            ReactionKind::Party => "party",
            ReactionKind::Smile => "smile",
        }
    }

    /// Human readable label for menus and tooltips.
    pub fn label(self) -> &'static str {
        match self {
            ReactionKind::ThumbUp => "Thumbs Up",
            ReactionKind::ThumbDown => "Thumbs Down",
            ReactionKind::Clap => "Clap",
            ReactionKind::Party => "Party",
            ReactionKind::Smile => "Smile",
        }
    }

    /// Glyph shown over a participant tile.
    pub fn glyph(self) -> &'static str {
        match self {
            ReactionKind::ThumbUp => "\u{1F44D}",
            ReactionKind::ThumbDown => "\u{1F44E}",
            ReactionKind::Clap => "\u{1F44F}",
            ReactionKind::Party => "\u{1F389}",
            ReactionKind::Smile => "\u{1F642}",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = ReactionError;

    /// Exact, case-sensitive match on the wire id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReactionError::UnknownKind(s.to_string()))
    }
}
