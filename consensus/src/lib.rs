//! YAC vote storage: decides, round by round, which hash the peers agreed on.
//!
//! Peers vote for a [`YacHash`](yac_types::YacHash) in each
//! [`Round`](yac_types::Round). A round commits once one hash gathers a
//! supermajority of distinct peers, and is rejected as soon as no hash can
//! get there even if every remaining peer voted for it.
//!
//! ## Module overview
//!
//! - [`vote_common`]: checks that a set of votes describes one round.
//! - [`supermajority`]: quorum arithmetic behind Commit and Reject.
//! - [`block_storage`]: votes for a single hash.
//! - [`round_storage`]: all hash buckets of a round and its latched outcome.
//! - [`equivocation`]: evidence of peers voting twice in a round.
//! - [`vote_storage`]: thread-safe storage across rounds.
//! - [`answer`]: Commit / Reject outcome.
//! - [`error`]: consensus error types.

pub mod answer;
pub mod block_storage;
pub mod equivocation;
pub mod error;
pub mod round_storage;
pub mod supermajority;
pub mod vote_common;
pub mod vote_storage;

pub use answer::{Answer, CommitMessage, OutcomeKind, RejectMessage};
pub use block_storage::BlockStorage;
pub use equivocation::{EquivocationLog, EquivocationProof};
pub use error::ConsensusError;
pub use round_storage::{BucketSnapshot, Insertion, RoundStorage, TallySnapshot};
pub use supermajority::{BftSupermajorityChecker, SupermajorityChecker};
pub use vote_common::{get_hash, get_key, same_keys};
pub use vote_storage::{VoteStorageConfig, YacVoteStorage};
