use proptest::prelude::*;

use yac_types::{PeerCount, Round};

proptest! {
    /// Round ordering matches tuple ordering of (block_round, reject_round).
    #[test]
    fn round_ordering_is_lexicographic(
        a in 0u64..1_000, b in 0u32..1_000, c in 0u64..1_000, d in 0u32..1_000,
    ) {
        let left = Round::new(a, b);
        let right = Round::new(c, d);
        prop_assert_eq!(left.cmp(&right), (a, b).cmp(&(c, d)));
    }

    /// next_reject and next_block always move forward.
    #[test]
    fn successor_rounds_are_greater(a in 0u64..u64::MAX - 1, b in 0u32..u32::MAX - 1) {
        let round = Round::new(a, b);
        prop_assert!(round.next_reject() > round);
        prop_assert!(round.next_block() > round);
        prop_assert!(round.next_block() > round.next_reject());
    }

    /// Any two supermajorities overlap in more than f peers, so at most one
    /// hash can commit in a round.
    #[test]
    fn supermajority_quorums_intersect_in_honest_peer(n in 1usize..10_000) {
        let peers = PeerCount::new(n);
        let t = peers.supermajority();
        let f = peers.fault_tolerance();
        prop_assert!(t <= n);
        prop_assert!(2 * t > n + f);
        prop_assert!(3 * t > 2 * n);
    }

    /// f is the largest value with 3f + 1 <= N.
    #[test]
    fn fault_tolerance_is_maximal(n in 1usize..10_000) {
        let f = PeerCount::new(n).fault_tolerance();
        prop_assert!(3 * f < n);
        prop_assert!(3 * (f + 1) >= n);
    }
}
