//! Helpers over a collection of votes that claims to describe one round.

use yac_types::{Round, VoteMessage, YacHash};

/// Whether every vote belongs to the same round. False for an empty slice.
pub fn same_keys(votes: &[VoteMessage]) -> bool {
    match votes.first() {
        None => false,
        Some(first) => votes.iter().all(|v| v.round() == first.round()),
    }
}

/// The round shared by all votes, if there is one.
pub fn get_key(votes: &[VoteMessage]) -> Option<Round> {
    if !same_keys(votes) {
        return None;
    }
    votes.first().map(VoteMessage::round)
}

/// The hash of the first vote, provided all votes share a round.
///
/// Only the round is checked. Callers that need one hash bucket must filter
/// by hash before calling this.
pub fn get_hash(votes: &[VoteMessage]) -> Option<YacHash> {
    if !same_keys(votes) {
        return None;
    }
    votes.first().map(|v| v.hash.clone())
}
