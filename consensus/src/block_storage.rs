//! Votes collected for a single hash within a round.

use yac_types::{PeerId, VoteMessage, YacHash};

/// One hash bucket: the distinct peers that voted for `key`, in arrival order.
///
/// Buckets hold at most one vote per peer of the round, so lookups are
/// linear scans over a short vector.
#[derive(Clone, Debug)]
pub struct BlockStorage {
    key: YacHash,
    votes: Vec<VoteMessage>,
}

impl BlockStorage {
    pub fn new(key: YacHash) -> Self {
        Self {
            key,
            votes: Vec::new(),
        }
    }

    pub fn key(&self) -> &YacHash {
        &self.key
    }

    /// Add a vote to the bucket.
    ///
    /// Returns `false` without storing anything if the vote is for a
    /// different hash or its signatory is already present.
    pub fn insert(&mut self, vote: VoteMessage) -> bool {
        if vote.hash != self.key || self.contains(&vote.signatory) {
            return false;
        }
        self.votes.push(vote);
        true
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.votes.iter().any(|v| v.signatory == *peer)
    }

    pub fn vote_of(&self, peer: &PeerId) -> Option<&VoteMessage> {
        self.votes.iter().find(|v| v.signatory == *peer)
    }

    pub fn votes(&self) -> &[VoteMessage] {
        &self.votes
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yac_types::{BlockHash, ProposalHash, Round, Signature};

    fn key(byte: u8) -> YacHash {
        YacHash::new(
            Round::new(1, 0),
            ProposalHash::new([byte; 32]),
            BlockHash::new([byte; 32]),
        )
    }

    fn vote(hash: YacHash, peer: u8) -> VoteMessage {
        VoteMessage::new(hash, PeerId::new([peer; 32]), Signature::EMPTY)
    }

    #[test]
    fn accepts_distinct_peers() {
        let mut bucket = BlockStorage::new(key(1));
        assert!(bucket.insert(vote(key(1), 1)));
        assert!(bucket.insert(vote(key(1), 2)));
        assert_eq!(bucket.len(), 2);
        assert!(bucket.contains(&PeerId::new([2; 32])));
    }

    #[test]
    fn rejects_repeat_signatory() {
        let mut bucket = BlockStorage::new(key(1));
        assert!(bucket.insert(vote(key(1), 1)));
        assert!(!bucket.insert(vote(key(1), 1)));
        assert_eq!(bucket.len(), 1);
    }

    #[test]
    fn rejects_foreign_hash() {
        let mut bucket = BlockStorage::new(key(1));
        assert!(!bucket.insert(vote(key(2), 1)));
        assert!(bucket.is_empty());
    }

    #[test]
    fn vote_of_returns_stored_vote() {
        let mut bucket = BlockStorage::new(key(1));
        bucket.insert(vote(key(1), 4));
        assert_eq!(bucket.vote_of(&PeerId::new([4; 32])), Some(&vote(key(1), 4)));
        assert!(bucket.vote_of(&PeerId::new([5; 32])).is_none());
    }
}
