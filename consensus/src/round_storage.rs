//! Tally of one round: hash buckets, voters and the latched outcome.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use yac_types::{PeerCount, PeerId, Round, VoteMessage, YacHash};

use crate::answer::{Answer, CommitMessage, OutcomeKind, RejectMessage};
use crate::block_storage::BlockStorage;
use crate::error::ConsensusError;
use crate::supermajority::SupermajorityChecker;

/// What happened to a vote handed to [`RoundStorage::insert`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// First vote of this peer in the round; added to its hash bucket.
    Counted,
    /// The peer already voted for the same hash, or this exact conflicting
    /// vote was already reported.
    Duplicate,
    /// The peer already voted for a different hash. Neither vote is removed
    /// from or added to the tally. Reported once per conflicting hash.
    Equivocation {
        first: VoteMessage,
        second: VoteMessage,
    },
}

/// Read-only view of one hash bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSnapshot {
    pub hash: YacHash,
    pub votes: usize,
}

/// Read-only view of a round's tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySnapshot {
    pub round: Round,
    /// `None` until the first vote of the round fixes the peer count.
    pub peers: Option<PeerCount>,
    /// Distinct peers with a counted vote.
    pub total_votes: usize,
    /// Buckets in the order their hash was first seen.
    pub buckets: Vec<BucketSnapshot>,
    pub outcome: Option<OutcomeKind>,
    /// Distinct conflicting votes seen in the round.
    pub equivocations: usize,
}

impl TallySnapshot {
    pub fn empty(round: Round) -> Self {
        Self {
            round,
            peers: None,
            total_votes: 0,
            buckets: Vec::new(),
            outcome: None,
            equivocations: 0,
        }
    }
}

/// Votes of a single round.
#[derive(Clone, Debug)]
pub struct RoundStorage {
    round: Round,
    peers: PeerCount,
    buckets: Vec<BlockStorage>,
    /// Peer → index of the bucket holding its counted vote.
    voters: HashMap<PeerId, usize>,
    outcome: Option<Answer>,
    /// Conflicting (peer, hash) pairs already reported.
    conflicts: HashSet<(PeerId, YacHash)>,
}

impl RoundStorage {
    pub fn new(round: Round, peers: PeerCount) -> Self {
        Self {
            round,
            peers,
            buckets: Vec::new(),
            voters: HashMap::new(),
            outcome: None,
            conflicts: HashSet::new(),
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn peers(&self) -> PeerCount {
        self.peers
    }

    /// Record a vote. First-seen wins: a peer's later vote never replaces
    /// its counted one.
    pub fn insert(&mut self, vote: VoteMessage) -> Result<Insertion, ConsensusError> {
        if vote.round() != self.round {
            return Err(ConsensusError::invalid_round(
                vote.round(),
                format!("vote routed to storage of round {}", self.round),
            ));
        }

        if let Some(&idx) = self.voters.get(&vote.signatory) {
            let bucket = &self.buckets[idx];
            if *bucket.key() == vote.hash {
                return Ok(Insertion::Duplicate);
            }
            if !self.conflicts.insert((vote.signatory, vote.hash.clone())) {
                return Ok(Insertion::Duplicate);
            }
            let first = bucket
                .vote_of(&vote.signatory)
                .cloned()
                .ok_or_else(|| {
                    ConsensusError::invalid_round(self.round, "voter index out of sync")
                })?;
            return Ok(Insertion::Equivocation {
                first,
                second: vote,
            });
        }

        if self.voters.len() >= self.peers.get() {
            return Err(ConsensusError::invalid_round(
                self.round,
                format!(
                    "vote from {} would exceed the {} peers of the round",
                    vote.signatory, self.peers
                ),
            ));
        }

        let idx = match self.buckets.iter().position(|b| *b.key() == vote.hash) {
            Some(idx) => idx,
            None => {
                self.buckets.push(BlockStorage::new(vote.hash.clone()));
                self.buckets.len() - 1
            }
        };
        let signatory = vote.signatory;
        self.buckets[idx].insert(vote);
        self.voters.insert(signatory, idx);
        Ok(Insertion::Counted)
    }

    /// Check the tally against the quorum rules.
    ///
    /// Returns the outcome only on the call that decides the round; once
    /// decided, the outcome is latched and later calls return `None`.
    pub fn evaluate(&mut self, checker: &dyn SupermajorityChecker) -> Option<Answer> {
        if self.outcome.is_some() {
            return None;
        }

        let answer = if let Some(bucket) = self
            .buckets
            .iter()
            .find(|b| checker.has_supermajority(b.len(), self.peers))
        {
            Answer::Commit(CommitMessage {
                votes: bucket.votes().to_vec(),
            })
        } else {
            let frequent = self.buckets.iter().map(BlockStorage::len).max().unwrap_or(0);
            if !checker.has_reject(frequent, self.voters.len(), self.peers) {
                return None;
            }
            Answer::Reject(RejectMessage {
                votes: self.all_votes(),
            })
        };

        self.outcome = Some(answer.clone());
        Some(answer)
    }

    pub fn outcome(&self) -> Option<&Answer> {
        self.outcome.as_ref()
    }

    pub fn total_votes(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, peer: &PeerId) -> bool {
        self.voters.contains_key(peer)
    }

    /// Every counted vote, grouped by bucket.
    pub fn all_votes(&self) -> Vec<VoteMessage> {
        self.buckets
            .iter()
            .flat_map(|b| b.votes().iter().cloned())
            .collect()
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            round: self.round,
            peers: Some(self.peers),
            total_votes: self.voters.len(),
            buckets: self
                .buckets
                .iter()
                .map(|b| BucketSnapshot {
                    hash: b.key().clone(),
                    votes: b.len(),
                })
                .collect(),
            outcome: self.outcome.as_ref().map(Answer::kind),
            equivocations: self.conflicts.len(),
        }
    }
}
