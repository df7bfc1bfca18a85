//! Proposals and commit notifications consumed by the ordering gate.

use serde::{Deserialize, Serialize};

/// Position of a block in the chain.
pub type Height = u64;

/// Anything the ordering gate can sequence by height.
pub trait Heighted {
    fn height(&self) -> Height;
}

/// A block proposal received from the ordering service.
///
/// The payload is opaque to the core; only the height is inspected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub height: Height,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_time: u64,
    pub payload: Vec<u8>,
}

impl Proposal {
    pub fn new(height: Height, created_time: u64, payload: Vec<u8>) -> Self {
        Self {
            height,
            created_time,
            payload,
        }
    }
}

impl Heighted for Proposal {
    fn height(&self) -> Height {
        self.height
    }
}

/// Notification that the block at `height` has been finalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitEvent {
    pub height: Height,
}

impl CommitEvent {
    pub fn new(height: Height) -> Self {
        Self { height }
    }
}
