//! Supermajority context for a round.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of peers participating in a round.
///
/// With `N` peers the round tolerates `f = floor((N - 1) / 3)` Byzantine
/// peers. A supermajority is strictly more than two thirds of `N`, which is
/// `2f + 1` when `N = 3f + 1` and larger otherwise, so that any two
/// supermajorities share at least one honest peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerCount(pub usize);

impl PeerCount {
    pub fn new(peers: usize) -> Self {
        Self(peers)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Maximum number of faulty peers the round tolerates.
    pub fn fault_tolerance(&self) -> usize {
        self.0.saturating_sub(1) / 3
    }

    /// Minimum number of distinct matching votes for a supermajority.
    pub fn supermajority(&self) -> usize {
        // floor(2N / 3) without forming 2N
        self.0 / 3 * 2 + self.0 % 3 * 2 / 3 + 1
    }
}

impl fmt::Display for PeerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_peers_tolerate_one_fault() {
        let peers = PeerCount::new(4);
        assert_eq!(peers.fault_tolerance(), 1);
        assert_eq!(peers.supermajority(), 3);
    }

    #[test]
    fn small_clusters() {
        assert_eq!(PeerCount::new(1).supermajority(), 1);
        assert_eq!(PeerCount::new(2).supermajority(), 2);
        assert_eq!(PeerCount::new(3).supermajority(), 3);
        assert_eq!(PeerCount::new(0).fault_tolerance(), 0);
    }

    #[test]
    fn matches_two_f_plus_one_for_3f_plus_1_peers() {
        for f in 0..20 {
            let peers = PeerCount::new(3 * f + 1);
            assert_eq!(peers.fault_tolerance(), f);
            assert_eq!(peers.supermajority(), 2 * f + 1);
        }
    }

    #[test]
    fn rounds_up_between_3f_plus_1_steps() {
        // 2f + 1 would be 3 here, letting two disjoint halves both commit.
        assert_eq!(PeerCount::new(6).supermajority(), 5);
        assert_eq!(PeerCount::new(5).supermajority(), 4);
    }

    #[test]
    fn huge_peer_count_does_not_overflow() {
        let peers = PeerCount::new(usize::MAX);
        // usize::MAX is a multiple of 3
        assert_eq!(peers.supermajority(), usize::MAX / 3 * 2 + 1);
        assert_eq!(PeerCount::new(usize::MAX - 1).fault_tolerance(), (usize::MAX - 2) / 3);
    }
}
