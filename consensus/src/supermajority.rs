//! Quorum arithmetic used to decide Commit and Reject.

use yac_types::PeerCount;

/// Decides whether vote counts amount to a supermajority or make one
/// impossible.
pub trait SupermajorityChecker: Send + Sync {
    /// Whether `current` matching votes out of `all` peers is a supermajority.
    fn has_supermajority(&self, current: usize, all: PeerCount) -> bool;

    /// Whether no hash can reach a supermajority any more.
    ///
    /// `frequent` is the size of the largest hash bucket, `voted` the number
    /// of distinct peers that have voted so far.
    fn has_reject(&self, frequent: usize, voted: usize, all: PeerCount) -> bool;
}

/// Strictly-more-than-two-thirds quorum over the peers of a round.
#[derive(Clone, Copy, Debug, Default)]
pub struct BftSupermajorityChecker;

impl SupermajorityChecker for BftSupermajorityChecker {
    fn has_supermajority(&self, current: usize, all: PeerCount) -> bool {
        current <= all.get() && current >= all.supermajority()
    }

    fn has_reject(&self, frequent: usize, voted: usize, all: PeerCount) -> bool {
        let not_voted = all.get().saturating_sub(voted);
        !self.has_supermajority(frequent + not_voted, all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supermajority_of_four() {
        let checker = BftSupermajorityChecker;
        let all = PeerCount::new(4);
        assert!(!checker.has_supermajority(2, all));
        assert!(checker.has_supermajority(3, all));
        assert!(checker.has_supermajority(4, all));
        assert!(!checker.has_supermajority(5, all));
    }

    #[test]
    fn reject_when_best_bucket_cannot_catch_up() {
        let checker = BftSupermajorityChecker;
        let all = PeerCount::new(4);
        // 1 + 1 + 1 split with one peer missing: best is 1 + 1 < 3
        assert!(checker.has_reject(1, 3, all));
        // 2 + 1 split with one peer missing: 2 + 1 = 3 still possible
        assert!(!checker.has_reject(2, 3, all));
        // 2 + 2 split, everyone voted
        assert!(checker.has_reject(2, 4, all));
    }

    #[test]
    fn no_reject_before_enough_votes() {
        let checker = BftSupermajorityChecker;
        assert!(!checker.has_reject(1, 1, PeerCount::new(4)));
        assert!(!checker.has_reject(1, 2, PeerCount::new(7)));
    }
}
