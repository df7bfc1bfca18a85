//! The agreement core: vote storage and ordering gate behind one handle.

use std::sync::Arc;

use prometheus::IntCounter;
use tracing::{debug, warn};
use yac_consensus::{Answer, ConsensusError, EquivocationProof, TallySnapshot, YacVoteStorage};
use yac_ordering::{ProposalCommitSynchronizer, ProposalSink, SynchronizerSnapshot};
use yac_types::{CommitEvent, Heighted, PeerCount, Round, VoteMessage};

use crate::config::NodeConfig;
use crate::metrics::CoreMetrics;
use crate::NodeError;

/// Counts releases before handing them on.
struct CountingSink<S> {
    inner: S,
    emitted: Option<IntCounter>,
}

impl<P, S: ProposalSink<P>> ProposalSink<P> for CountingSink<S> {
    fn deliver(&self, proposal: P) {
        if let Some(counter) = &self.emitted {
            counter.inc();
        }
        self.inner.deliver(proposal);
    }
}

/// Entry point for network-receive threads.
///
/// Votes go to the shared [`YacVoteStorage`]; proposals and commit events
/// go to the ordering gate, which releases proposals to `sink` one at a
/// time in increasing height order.
pub struct AgreementCore<P> {
    storage: Arc<YacVoteStorage>,
    synchronizer: ProposalCommitSynchronizer<P>,
    metrics: Option<CoreMetrics>,
}

impl<P: Heighted + Send + 'static> AgreementCore<P> {
    pub fn new(config: &NodeConfig, sink: impl ProposalSink<P> + 'static) -> Result<Self, NodeError> {
        let storage = Arc::new(YacVoteStorage::new(config.vote_storage.clone()));
        Self::with_storage(config, storage, sink)
    }

    /// Build a core around an existing storage, e.g. one shared with a
    /// second consumer of the vote tally.
    pub fn with_storage(
        config: &NodeConfig,
        storage: Arc<YacVoteStorage>,
        sink: impl ProposalSink<P> + 'static,
    ) -> Result<Self, NodeError> {
        let metrics = if config.enable_metrics {
            Some(CoreMetrics::new()?)
        } else {
            None
        };
        let sink = CountingSink {
            inner: sink,
            emitted: metrics.as_ref().map(|m| m.proposals_emitted.clone()),
        };
        let synchronizer = ProposalCommitSynchronizer::new(config.synchronizer.clone(), sink);
        if let Some(m) = &metrics {
            m.last_committed_height
                .set(gauge_value(config.synchronizer.starting_height));
        }

        Ok(Self {
            storage,
            synchronizer,
            metrics,
        })
    }
}

impl<P: Heighted> AgreementCore<P> {
    /// Store one vote. Returns the answer if this vote decided its round.
    pub fn on_vote(&self, vote: VoteMessage, peers: PeerCount) -> Result<Option<Answer>, NodeError> {
        if let Some(m) = &self.metrics {
            m.votes_received.inc();
        }
        let result = self.storage.store(vote, peers);
        self.record(result)
    }

    /// Store the votes of a state message, all from one round.
    pub fn on_state(
        &self,
        votes: Vec<VoteMessage>,
        peers: PeerCount,
    ) -> Result<Option<Answer>, NodeError> {
        if let Some(m) = &self.metrics {
            m.votes_received.inc_by(votes.len() as u64);
        }
        let result = self.storage.store_state(votes, peers);
        self.record(result)
    }

    fn record(
        &self,
        result: Result<Option<Answer>, ConsensusError>,
    ) -> Result<Option<Answer>, NodeError> {
        if let Some(m) = &self.metrics {
            m.equivocations_recorded
                .set(gauge_value(self.storage.equivocations_recorded()));
        }

        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "refusing votes");
                if let Some(m) = &self.metrics {
                    m.votes_rejected_invalid.inc();
                }
                return Err(e.into());
            }
        };

        if let Some(answer) = &answer {
            debug!(
                round = ?answer.round(),
                commit = answer.is_commit(),
                "returning answer to caller"
            );
            if let Some(m) = &self.metrics {
                if answer.is_commit() {
                    m.rounds_committed.inc();
                } else {
                    m.rounds_rejected.inc();
                }
                m.answer_votes.observe(answer.votes().len() as f64);
            }
        }
        Ok(answer)
    }

    pub fn on_proposal(&self, proposal: P) {
        if let Some(m) = &self.metrics {
            m.proposals_received.inc();
        }
        self.synchronizer.on_proposal(proposal);
        self.update_gauges();
    }

    pub fn on_commit(&self, event: CommitEvent) {
        if let Some(m) = &self.metrics {
            m.commit_events.inc();
        }
        self.synchronizer.on_commit(event);
        self.update_gauges();
    }

    fn update_gauges(&self) {
        if let Some(m) = &self.metrics {
            let snapshot = self.synchronizer.snapshot();
            m.pending_proposals
                .set(gauge_value(snapshot.pending_heights.len() as u64));
            m.last_committed_height
                .set(gauge_value(snapshot.last_committed_height));
        }
    }

    pub fn tally(&self, round: Round) -> TallySnapshot {
        self.storage.get_state(round)
    }

    /// Drop every round below `round` from the vote storage.
    pub fn prune_rounds_below(&self, round: Round) -> usize {
        self.storage.prune_below(round)
    }

    pub fn take_equivocations(&self) -> Vec<EquivocationProof> {
        self.storage.take_equivocations()
    }

    pub fn ordering_snapshot(&self) -> SynchronizerSnapshot {
        self.synchronizer.snapshot()
    }

    pub fn storage(&self) -> &Arc<YacVoteStorage> {
        &self.storage
    }

    pub fn metrics(&self) -> Option<&CoreMetrics> {
        self.metrics.as_ref()
    }
}

fn gauge_value(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use yac_types::{BlockHash, PeerId, Proposal, ProposalHash, Signature, YacHash};

    type Released = Arc<Mutex<Vec<u64>>>;

    fn core(enable_metrics: bool) -> (AgreementCore<Proposal>, Released) {
        let released: Released = Arc::default();
        let sink = {
            let released = Arc::clone(&released);
            move |p: Proposal| released.lock().unwrap().push(p.height)
        };
        let config = NodeConfig {
            enable_metrics,
            ..NodeConfig::default()
        };
        (AgreementCore::new(&config, sink).unwrap(), released)
    }

    fn vote(round: Round, hash: u8, peer: u8) -> VoteMessage {
        VoteMessage::new(
            YacHash::new(round, ProposalHash::new([hash; 32]), BlockHash::new([hash; 32])),
            PeerId::new([peer; 32]),
            Signature::EMPTY,
        )
    }

    #[test]
    fn core_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AgreementCore<Proposal>>();
    }

    #[test]
    fn commit_counted_in_metrics() {
        let (core, _) = core(true);
        let round = Round::new(1, 0);
        let peers = PeerCount::new(4);

        assert!(core.on_vote(vote(round, 1, 1), peers).unwrap().is_none());
        assert!(core.on_vote(vote(round, 1, 2), peers).unwrap().is_none());
        let answer = core.on_vote(vote(round, 1, 3), peers).unwrap().unwrap();
        assert!(answer.is_commit());

        let m = core.metrics().unwrap();
        assert_eq!(m.votes_received.get(), 3);
        assert_eq!(m.rounds_committed.get(), 1);
        assert_eq!(m.rounds_rejected.get(), 0);
        assert_eq!(m.answer_votes.get_sample_count(), 1);
    }

    #[test]
    fn invalid_vote_counted_and_returned() {
        let (core, _) = core(true);
        let err = core
            .on_vote(vote(Round::new(1, 0), 1, 1), PeerCount::new(0))
            .unwrap_err();
        assert!(matches!(
            err,
            NodeError::Consensus(ConsensusError::InvalidRound { .. })
        ));
        assert_eq!(core.metrics().unwrap().votes_rejected_invalid.get(), 1);
    }

    #[test]
    fn empty_state_is_an_error() {
        let (core, _) = core(false);
        let err = core.on_state(Vec::new(), PeerCount::new(4)).unwrap_err();
        assert!(matches!(err, NodeError::Consensus(ConsensusError::EmptyState)));
    }

    #[test]
    fn state_message_decides_round() {
        let (core, _) = core(false);
        let round = Round::new(2, 0);
        let votes = (1..=3).map(|p| vote(round, 7, p)).collect();
        let answer = core.on_state(votes, PeerCount::new(4)).unwrap().unwrap();
        assert!(answer.is_commit());
        assert_eq!(core.tally(round).total_votes, 3);
    }

    #[test]
    fn equivocation_gauge_follows_storage() {
        let (core, _) = core(true);
        let round = Round::new(1, 0);
        core.on_vote(vote(round, 1, 1), PeerCount::new(4)).unwrap();
        core.on_vote(vote(round, 2, 1), PeerCount::new(4)).unwrap();

        assert_eq!(core.metrics().unwrap().equivocations_recorded.get(), 1);
        let proofs = core.take_equivocations();
        assert_eq!(proofs.len(), 1);
        assert!(core.take_equivocations().is_empty());
        // taking proofs does not reset the lifetime count
        assert_eq!(core.metrics().unwrap().equivocations_recorded.get(), 1);
    }

    #[test]
    fn proposals_flow_through_gate() {
        let (core, released) = core(true);
        core.on_proposal(Proposal::new(3, 0, vec![]));
        core.on_proposal(Proposal::new(2, 0, vec![]));
        core.on_proposal(Proposal::new(4, 0, vec![]));
        assert_eq!(*released.lock().unwrap(), vec![3]);

        core.on_commit(CommitEvent::new(3));
        assert_eq!(*released.lock().unwrap(), vec![3, 4]);

        let m = core.metrics().unwrap();
        assert_eq!(m.proposals_received.get(), 3);
        assert_eq!(m.proposals_emitted.get(), 2);
        assert_eq!(m.commit_events.get(), 1);
        assert_eq!(m.last_committed_height.get(), 3);
        assert_eq!(m.pending_proposals.get(), 0);
    }

    #[test]
    fn metrics_disabled_by_default() {
        let (core, _) = core(false);
        assert!(core.metrics().is_none());
    }
}
