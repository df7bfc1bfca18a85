//! Value types for the YAC agreement core.
//!
//! This crate defines the types produced by the transport layer and consumed
//! by the vote storage and the ordering gate: rounds, the hash a vote
//! endorses, peer identities, signatures, votes, peer counts, proposals and
//! commit notifications. None of them carry behaviour beyond comparison,
//! quorum arithmetic and formatting.

pub mod digest;
pub mod keys;
pub mod peers;
pub mod proposal;
pub mod round;
pub mod vote;

pub use digest::{BlockHash, ProposalHash};
pub use keys::{PeerId, Signature};
pub use peers::PeerCount;
pub use proposal::{CommitEvent, Height, Heighted, Proposal};
pub use round::Round;
pub use vote::{VoteMessage, YacHash};
