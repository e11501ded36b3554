use serde::Serialize;

use crate::domain::ReactionKind;

/// Visible reactions per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    pub thumbup: usize,
    pub thumbdown: usize,
    pub clap: usize,
    pub party: usize,
    pub smile: usize,
}

impl ReactionCounts {
    /// Count one reaction of `kind`.
    pub fn record(&mut self, kind: ReactionKind) {
        match kind {
            ReactionKind::ThumbUp => self.thumbup += 1,
            ReactionKind::ThumbDown => self.thumbdown += 1,
            ReactionKind::Clap => self.clap += 1,
            ReactionKind::Party => self.party += 1,
            ReactionKind::Smile => self.smile += 1,
        }
    }

    /// Reactions across all kinds.
    pub fn total(&self) -> usize {
        self.thumbup + self.thumbdown + self.clap + self.party + self.smile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_total() {
        let mut counts = ReactionCounts::default();
        counts.record(ReactionKind::Clap);
        counts.record(ReactionKind::Clap);
        counts.record(ReactionKind::Smile);

        assert_eq!(counts.clap, 2);
        assert_eq!(counts.smile, 1);
        assert_eq!(counts.total(), 3);
    }
}
