//! Ordering gate: sequences block proposals into the voting pipeline.
//!
//! Proposals and commit notifications arrive on independent, reorderable
//! streams. [`ProposalCommitSynchronizer`] merges them into a single stream
//! that is strictly increasing in height and releases at most one proposal
//! per commit, so the voting stage is never asked to vote twice without an
//! intervening commit.

pub mod config;
pub mod sink;
pub mod synchronizer;

pub use config::SynchronizerConfig;
pub use sink::{ChannelSink, ProposalSink};
pub use synchronizer::{ProposalCommitSynchronizer, SynchronizerSnapshot};
