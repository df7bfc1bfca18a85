//! Thread-safe vote storage across rounds.
//!
//! Network-receive threads call [`YacVoteStorage::store`] concurrently. A
//! single mutex guards the whole state so that inserting a vote and checking
//! the quorum happen as one step; an [`Answer`] is returned to exactly one
//! caller per round.
//!
//! At most `max_rounds` rounds are tracked. A decided round at the bottom of
//! the window is evicted to make room; an undecided round never is, so a new
//! round is refused while the window is full of undecided ones. Evicting a
//! round, or pruning explicitly with [`YacVoteStorage::prune_below`],
//! advances a purge watermark. Votes for rounds under the watermark are
//! accepted and ignored.

use std::collections::{BTreeMap, HashSet};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use yac_types::{PeerCount, Round, VoteMessage};

use crate::answer::Answer;
use crate::equivocation::{EquivocationLog, EquivocationProof};
use crate::error::ConsensusError;
use crate::round_storage::{Insertion, RoundStorage, TallySnapshot};
use crate::supermajority::{BftSupermajorityChecker, SupermajorityChecker};
use crate::vote_common;

/// Retention limits of the vote storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStorageConfig {
    /// Maximum number of rounds tracked at once.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Maximum number of equivocation proofs held for collection.
    #[serde(default = "default_max_equivocation_proofs")]
    pub max_equivocation_proofs: usize,
}

fn default_max_rounds() -> usize {
    128
}

fn default_max_equivocation_proofs() -> usize {
    1024
}

impl Default for VoteStorageConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            max_equivocation_proofs: default_max_equivocation_proofs(),
        }
    }
}

struct StorageState {
    rounds: BTreeMap<Round, RoundStorage>,
    /// Rounds strictly below this are purged.
    purged_below: Option<Round>,
    evidence: EquivocationLog,
    max_rounds: usize,
}

impl StorageState {
    fn is_purged(&self, round: Round) -> bool {
        self.purged_below.map_or(false, |w| round < w)
    }

    fn advance_watermark(&mut self, below: Round) {
        if self.purged_below.map_or(true, |w| below > w) {
            self.purged_below = Some(below);
        }
    }

    /// Evict decided rounds from the bottom of the window until a new round
    /// fits. Returns `false` if the lowest round is still undecided.
    fn make_room(&mut self) -> bool {
        while self.rounds.len() >= self.max_rounds.max(1) {
            let Some(entry) = self.rounds.first_entry() else {
                break;
            };
            if entry.get().outcome().is_none() {
                return false;
            }
            let (oldest, _) = entry.remove_entry();
            self.advance_watermark(oldest.next_reject());
            debug!(round = %oldest, "evicted decided round from vote storage");
        }
        true
    }

    /// Check that every vote of a one-round batch can be stored, so the batch
    /// fails before anything is counted.
    fn check_batch(
        &self,
        round: Round,
        votes: &[VoteMessage],
        peers: PeerCount,
    ) -> Result<(), ConsensusError> {
        if peers.get() == 0 {
            return Err(ConsensusError::invalid_round(round, "round has no peers"));
        }
        if self.is_purged(round) {
            return Ok(());
        }

        let existing = self.rounds.get(&round);
        if let Some(storage) = existing {
            if storage.peers() != peers {
                return Err(peer_count_mismatch(round, peers, storage.peers()));
            }
        }
        let newcomers: HashSet<_> = votes
            .iter()
            .map(|v| v.signatory)
            .filter(|peer| existing.map_or(true, |s| !s.has_voted(peer)))
            .collect();
        let voters = existing.map_or(0, RoundStorage::total_votes) + newcomers.len();
        if voters > peers.get() {
            return Err(ConsensusError::invalid_round(
                round,
                format!("state would bring {voters} voters to a round of {peers} peers"),
            ));
        }
        Ok(())
    }

    fn store(
        &mut self,
        vote: VoteMessage,
        peers: PeerCount,
        checker: &dyn SupermajorityChecker,
    ) -> Result<Option<Answer>, ConsensusError> {
        let round = vote.round();

        if peers.get() == 0 {
            return Err(ConsensusError::invalid_round(round, "round has no peers"));
        }

        if self.is_purged(round) {
            debug!(round = %round, peer = %vote.signatory, "ignoring vote for purged round");
            return Ok(None);
        }

        if !self.rounds.contains_key(&round) && !self.make_room() {
            warn!(
                round = %round,
                peer = %vote.signatory,
                max_rounds = self.max_rounds,
                "vote storage full of undecided rounds, refusing new round"
            );
            return Ok(None);
        }

        let storage = self
            .rounds
            .entry(round)
            .or_insert_with(|| RoundStorage::new(round, peers));

        if storage.peers() != peers {
            return Err(peer_count_mismatch(round, peers, storage.peers()));
        }

        match storage.insert(vote)? {
            Insertion::Duplicate => Ok(None),
            Insertion::Equivocation { first, second } => {
                warn!(
                    round = %round,
                    peer = %first.signatory,
                    first = ?first.hash.block_hash,
                    second = ?second.hash.block_hash,
                    "peer voted for two hashes in one round"
                );
                self.evidence.record(EquivocationProof {
                    round,
                    peer: first.signatory,
                    first,
                    second,
                });
                Ok(None)
            }
            Insertion::Counted => {
                let answer = storage.evaluate(checker);
                if let Some(answer) = &answer {
                    info!(
                        round = %round,
                        outcome = ?answer.kind(),
                        hash = ?answer.committed_hash().map(|h| h.block_hash),
                        votes = answer.votes().len(),
                        peers = %peers,
                        "round decided"
                    );
                }
                Ok(answer)
            }
        }
    }
}

fn peer_count_mismatch(round: Round, peers: PeerCount, fixed: PeerCount) -> ConsensusError {
    ConsensusError::invalid_round(
        round,
        format!("peer count {peers} differs from {fixed} fixed for the round"),
    )
}

/// Per-round vote tally producing a Commit or Reject once per round.
pub struct YacVoteStorage {
    state: Mutex<StorageState>,
    checker: Box<dyn SupermajorityChecker>,
}

impl YacVoteStorage {
    pub fn new(config: VoteStorageConfig) -> Self {
        Self::with_checker(config, BftSupermajorityChecker)
    }

    pub fn with_checker(
        config: VoteStorageConfig,
        checker: impl SupermajorityChecker + 'static,
    ) -> Self {
        Self {
            state: Mutex::new(StorageState {
                rounds: BTreeMap::new(),
                purged_below: None,
                evidence: EquivocationLog::new(config.max_equivocation_proofs),
                max_rounds: config.max_rounds,
            }),
            checker: Box::new(checker),
        }
    }

    /// Store a vote and return the round's outcome if this vote decided it.
    ///
    /// Repeated votes are no-ops; a peer's vote for a second hash in the same
    /// round is kept as equivocation evidence and not counted.
    pub fn store(
        &self,
        vote: VoteMessage,
        peers: PeerCount,
    ) -> Result<Option<Answer>, ConsensusError> {
        self.state.lock().store(vote, peers, self.checker.as_ref())
    }

    /// Store every vote of a state message, which must all share one round.
    ///
    /// Returns the outcome if one of the votes decided the round.
    pub fn store_state(
        &self,
        votes: Vec<VoteMessage>,
        peers: PeerCount,
    ) -> Result<Option<Answer>, ConsensusError> {
        let Some(first) = votes.first() else {
            return Err(ConsensusError::EmptyState);
        };
        if !vote_common::same_keys(&votes) {
            return Err(ConsensusError::invalid_round(
                first.round(),
                "state message spans several rounds",
            ));
        }

        let round = first.round();
        let mut state = self.state.lock();
        state.check_batch(round, &votes, peers)?;

        let mut decided = None;
        for vote in votes {
            match state.store(vote, peers, self.checker.as_ref()) {
                Ok(Some(answer)) => {
                    decided.get_or_insert(answer);
                }
                Ok(None) => {}
                Err(e) if decided.is_some() => {
                    warn!(round = %round, error = %e, "dropping rest of state after decision");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(decided)
    }

    /// Snapshot of a round's tally. Unknown or purged rounds give an empty
    /// snapshot.
    pub fn get_state(&self, round: Round) -> TallySnapshot {
        self.state
            .lock()
            .rounds
            .get(&round)
            .map(RoundStorage::snapshot)
            .unwrap_or_else(|| TallySnapshot::empty(round))
    }

    /// The latched outcome of a round, if it has been decided.
    pub fn outcome(&self, round: Round) -> Option<Answer> {
        self.state
            .lock()
            .rounds
            .get(&round)
            .and_then(|s| s.outcome().cloned())
    }

    /// Drop every round below `round`; later votes for them are ignored.
    pub fn prune_below(&self, round: Round) -> usize {
        let mut state = self.state.lock();
        let kept = state.rounds.split_off(&round);
        let removed = std::mem::replace(&mut state.rounds, kept).len();
        state.advance_watermark(round);
        if removed > 0 {
            debug!(below = %round, removed, "pruned vote storage");
        }
        removed
    }

    /// Equivocation proofs currently held, oldest first.
    pub fn equivocations(&self) -> Vec<EquivocationProof> {
        self.state.lock().evidence.proofs().cloned().collect()
    }

    /// Remove and return the held equivocation proofs.
    pub fn take_equivocations(&self) -> Vec<EquivocationProof> {
        self.state.lock().evidence.take()
    }

    /// Equivocations seen over the storage's lifetime, including taken and
    /// dropped proofs.
    pub fn equivocations_recorded(&self) -> u64 {
        self.state.lock().evidence.total_recorded()
    }

    /// Number of rounds currently tracked.
    pub fn round_count(&self) -> usize {
        self.state.lock().rounds.len()
    }
}

impl Default for YacVoteStorage {
    fn default() -> Self {
        Self::new(VoteStorageConfig::default())
    }
}
