//! Consumers of released proposals.

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use yac_types::Heighted;

/// Receives proposals released by the ordering gate.
///
/// `deliver` runs on the thread that triggered the release, while the gate's
/// lock is held. It must not block and must not call back into the gate.
pub trait ProposalSink<P>: Send + Sync {
    fn deliver(&self, proposal: P);
}

impl<P, F> ProposalSink<P> for F
where
    F: Fn(P) + Send + Sync,
{
    fn deliver(&self, proposal: P) {
        self(proposal)
    }
}

/// Forwards released proposals into an unbounded tokio channel, for a
/// voting stage running on its own task.
pub struct ChannelSink<P> {
    sender: UnboundedSender<P>,
}

impl<P> ChannelSink<P> {
    pub fn new(sender: UnboundedSender<P>) -> Self {
        Self { sender }
    }
}

impl<P: Heighted + Send> ProposalSink<P> for ChannelSink<P> {
    fn deliver(&self, proposal: P) {
        if let Err(err) = self.sender.send(proposal) {
            warn!(height = err.0.height(), "voting stage channel closed, dropping proposal");
        }
    }
}
