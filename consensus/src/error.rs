use thiserror::Error;
use yac_types::Round;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("invalid round {round}: {reason}")]
    InvalidRound { round: Round, reason: String },

    #[error("state message carries no votes")]
    EmptyState,
}

impl ConsensusError {
    pub(crate) fn invalid_round(round: Round, reason: impl Into<String>) -> Self {
        Self::InvalidRound {
            round,
            reason: reason.into(),
        }
    }
}
