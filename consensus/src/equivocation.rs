//! Equivocation evidence: peers that voted for two hashes in one round.
//!
//! A peer may endorse only one hash per round. The vote storage keeps the
//! first vote it saw and discards the conflicting one from the tally; both
//! votes are kept here as evidence so an external auditor can act on them.
//! The log is bounded: when full, the oldest proof is dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use yac_types::{PeerId, Round, VoteMessage};

/// Two signed votes from the same peer for different hashes in one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivocationProof {
    pub round: Round,
    pub peer: PeerId,
    /// The vote that was counted.
    pub first: VoteMessage,
    /// The conflicting vote that was discarded.
    pub second: VoteMessage,
}

/// Bounded FIFO of equivocation proofs.
#[derive(Clone, Debug)]
pub struct EquivocationLog {
    proofs: VecDeque<EquivocationProof>,
    capacity: usize,
    /// Proofs recorded over the log's lifetime, including dropped ones.
    total_recorded: u64,
}

impl EquivocationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            proofs: VecDeque::new(),
            capacity,
            total_recorded: 0,
        }
    }

    /// Record a proof. Returns `false` if an identical proof is already held.
    pub fn record(&mut self, proof: EquivocationProof) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let known = self.proofs.iter().any(|p| {
            p.round == proof.round && p.peer == proof.peer && p.second.hash == proof.second.hash
        });
        if known {
            return false;
        }
        if self.proofs.len() >= self.capacity {
            self.proofs.pop_front();
        }
        self.proofs.push_back(proof);
        self.total_recorded += 1;
        true
    }

    pub fn proofs(&self) -> impl Iterator<Item = &EquivocationProof> {
        self.proofs.iter()
    }

    /// Remove and return every held proof, oldest first.
    pub fn take(&mut self) -> Vec<EquivocationProof> {
        self.proofs.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }
}
