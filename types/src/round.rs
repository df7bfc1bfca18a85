//! Consensus round identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One attempt at reaching agreement for a block.
///
/// `block_round` advances when a block is committed, `reject_round` advances
/// each time the peers fail to agree within the same block round. The derived
/// ordering is lexicographic over `(block_round, reject_round)` because of the
/// field order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Round {
    pub block_round: u64,
    pub reject_round: u32,
}

impl Round {
    pub fn new(block_round: u64, reject_round: u32) -> Self {
        Self {
            block_round,
            reject_round,
        }
    }

    /// The round that follows a reject in this block round.
    pub fn next_reject(&self) -> Self {
        Self::new(self.block_round, self.reject_round.saturating_add(1))
    }

    /// The first round of the next block round.
    pub fn next_block(&self) -> Self {
        Self::new(self.block_round.saturating_add(1), 0)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_round, self.reject_round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Round::new(1, 5) < Round::new(2, 0));
        assert!(Round::new(2, 0) < Round::new(2, 1));
        assert_eq!(Round::new(3, 3), Round::new(3, 3));
    }

    #[test]
    fn next_reject_keeps_block_round() {
        let r = Round::new(7, 2).next_reject();
        assert_eq!(r, Round::new(7, 3));
    }

    #[test]
    fn next_block_resets_reject_round() {
        let r = Round::new(7, 2).next_block();
        assert_eq!(r, Round::new(8, 0));
        assert!(r > Round::new(7, 2));
    }

    #[test]
    fn display_shows_both_components() {
        assert_eq!(Round::new(4, 1).to_string(), "(4, 1)");
    }
}
