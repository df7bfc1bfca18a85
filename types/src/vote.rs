//! Votes and the hash they endorse.

use serde::{Deserialize, Serialize};

use crate::digest::{BlockHash, ProposalHash};
use crate::keys::{PeerId, Signature};
use crate::round::Round;

/// The candidate a vote endorses. Two votes agree iff their `YacHash`
/// values are equal, round included.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YacHash {
    pub vote_round: Round,
    pub proposal_hash: ProposalHash,
    pub block_hash: BlockHash,
}

impl YacHash {
    pub fn new(vote_round: Round, proposal_hash: ProposalHash, block_hash: BlockHash) -> Self {
        Self {
            vote_round,
            proposal_hash,
            block_hash,
        }
    }
}

/// One peer's signed endorsement of a [`YacHash`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteMessage {
    pub hash: YacHash,
    pub signatory: PeerId,
    pub signature: Signature,
}

impl VoteMessage {
    pub fn new(hash: YacHash, signatory: PeerId, signature: Signature) -> Self {
        Self {
            hash,
            signatory,
            signature,
        }
    }

    pub fn round(&self) -> Round {
        self.hash.vote_round
    }
}
