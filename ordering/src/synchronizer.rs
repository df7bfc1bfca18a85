//! Proposal/commit synchronizer.
//!
//! State machine:
//! - `unlocked` starts true and is set by every commit that advances the
//!   committed height. Releasing a proposal clears it.
//! - A proposal at or below the committed height, or at or below the last
//!   released height, is stale and dropped. So is a second proposal for a
//!   height already queued.
//! - A commit purges every queued proposal at or below its height.
//! - While unlocked, the lowest queued proposal is released.
//!
//! All transitions, including the call into the sink, happen under one lock,
//! which keeps releases in height order across threads.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};
use yac_types::{CommitEvent, Height, Heighted};

use crate::config::SynchronizerConfig;
use crate::sink::ProposalSink;

/// Diagnostic view of the synchronizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SynchronizerSnapshot {
    pub last_committed_height: Height,
    pub last_emitted_height: Option<Height>,
    pub pending_heights: Vec<Height>,
    pub unlocked: bool,
    pub emitted: u64,
    pub discarded: u64,
}

struct SyncState<P> {
    last_committed_height: Height,
    last_emitted_height: Option<Height>,
    pending: BTreeMap<Height, P>,
    unlocked: bool,
    max_pending: usize,
    emitted: u64,
    discarded: u64,
}

impl<P: Heighted> SyncState<P> {
    /// Heights at or below this are never released again.
    fn stale_bound(&self) -> Height {
        self.last_emitted_height
            .map_or(self.last_committed_height, |h| h.max(self.last_committed_height))
    }

    fn enqueue(&mut self, proposal: P) {
        let height = proposal.height();

        if height <= self.stale_bound() {
            self.discarded += 1;
            debug!(
                height,
                committed = self.last_committed_height,
                "discarding stale proposal"
            );
            return;
        }
        if self.pending.contains_key(&height) {
            self.discarded += 1;
            debug!(height, "discarding duplicate proposal for queued height");
            return;
        }
        if self.pending.len() >= self.max_pending {
            // the lowest heights are released first, so the highest one goes
            let highest = self.pending.last_key_value().map(|(&h, _)| h);
            self.discarded += 1;
            match highest {
                Some(highest) if height < highest => {
                    self.pending.pop_last();
                    warn!(
                        height,
                        dropped = highest,
                        max_pending = self.max_pending,
                        "proposal queue full, dropping highest queued proposal"
                    );
                }
                _ => {
                    warn!(
                        height,
                        max_pending = self.max_pending,
                        "proposal queue full, discarding proposal"
                    );
                    return;
                }
            }
        }
        self.pending.insert(height, proposal);
    }

    /// Apply a commit. Returns `false` for a commit that does not advance the
    /// committed height.
    fn commit(&mut self, event: CommitEvent) -> bool {
        if event.height <= self.last_committed_height {
            debug!(
                height = event.height,
                committed = self.last_committed_height,
                "ignoring commit that does not advance the chain"
            );
            return false;
        }
        self.last_committed_height = event.height;

        let before = self.pending.len();
        self.pending.retain(|&height, _| height > event.height);
        let purged = before - self.pending.len();
        if purged > 0 {
            self.discarded += purged as u64;
            debug!(height = event.height, purged, "purged proposals covered by commit");
        }
        self.unlocked = true;
        true
    }

    /// Take the lowest queued proposal if the gate is unlocked.
    fn release(&mut self) -> Option<P> {
        if !self.unlocked {
            return None;
        }
        let (height, proposal) = self.pending.pop_first()?;
        self.unlocked = false;
        self.last_emitted_height = Some(height);
        self.emitted += 1;
        Some(proposal)
    }
}

/// Merges proposals and commits into one height-ordered proposal stream.
pub struct ProposalCommitSynchronizer<P> {
    state: Mutex<SyncState<P>>,
    sink: Box<dyn ProposalSink<P>>,
}

impl<P: Heighted> ProposalCommitSynchronizer<P> {
    pub fn new(config: SynchronizerConfig, sink: impl ProposalSink<P> + 'static) -> Self {
        Self {
            state: Mutex::new(SyncState {
                last_committed_height: config.starting_height,
                last_emitted_height: None,
                pending: BTreeMap::new(),
                unlocked: true,
                max_pending: config.max_pending,
                emitted: 0,
                discarded: 0,
            }),
            sink: Box::new(sink),
        }
    }

    /// Queue a proposal and release the lowest one if the gate is unlocked.
    pub fn on_proposal(&self, proposal: P) {
        let mut state = self.state.lock();
        state.enqueue(proposal);
        self.release_next(&mut state);
    }

    /// Record a commit, purge what it covers and release the next proposal.
    pub fn on_commit(&self, event: CommitEvent) {
        let mut state = self.state.lock();
        if state.commit(event) {
            self.release_next(&mut state);
        }
    }

    fn release_next(&self, state: &mut SyncState<P>) {
        if let Some(proposal) = state.release() {
            info!(
                height = proposal.height(),
                committed = state.last_committed_height,
                "releasing proposal to voting"
            );
            self.sink.deliver(proposal);
        }
    }

    pub fn last_committed_height(&self) -> Height {
        self.state.lock().last_committed_height
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn snapshot(&self) -> SynchronizerSnapshot {
        let state = self.state.lock();
        SynchronizerSnapshot {
            last_committed_height: state.last_committed_height,
            last_emitted_height: state.last_emitted_height,
            pending_heights: state.pending.keys().copied().collect(),
            unlocked: state.unlocked,
            emitted: state.emitted,
            discarded: state.discarded,
        }
    }
}
