//! Outcome of a round.

use serde::{Deserialize, Serialize};
use yac_types::{Round, VoteMessage, YacHash};

use crate::vote_common;

/// Supermajority of votes for one hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    pub votes: Vec<VoteMessage>,
}

/// Votes of a round in which no hash can reach a supermajority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectMessage {
    pub votes: Vec<VoteMessage>,
}

/// Decided outcome of a round, carrying the votes that justify it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Commit(CommitMessage),
    Reject(RejectMessage),
}

/// Payload-free tag of an [`Answer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Commit,
    Reject,
}

impl Answer {
    pub fn votes(&self) -> &[VoteMessage] {
        match self {
            Answer::Commit(msg) => &msg.votes,
            Answer::Reject(msg) => &msg.votes,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Answer::Commit(_) => OutcomeKind::Commit,
            Answer::Reject(_) => OutcomeKind::Reject,
        }
    }

    pub fn round(&self) -> Option<Round> {
        vote_common::get_key(self.votes())
    }

    /// The committed hash; `None` for a reject.
    pub fn committed_hash(&self) -> Option<YacHash> {
        match self {
            Answer::Commit(msg) => vote_common::get_hash(&msg.votes),
            Answer::Reject(_) => None,
        }
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, Answer::Commit(_))
    }
}
