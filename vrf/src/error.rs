use oracle_types::ChainPoint;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VrfError {
    #[error("point not found: {0}")]
    PointNotFound(ChainPoint),

    #[error("target {target} not reached within step budget {budget}")]
    StepBudgetExceeded { target: ChainPoint, budget: u64 },

    #[error("chain-sync protocol error: {0}")]
    Protocol(String),

    #[error("failed to connect to chain-sync endpoint: {0}")]
    Connect(String),

    #[error("chain-sync transport error: {0}")]
    Transport(String),
}

impl VrfError {
    /// Whether the failure means the requested block could not be found, as
    /// opposed to the endpoint misbehaving or being unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PointNotFound(_) | Self::StepBudgetExceeded { .. })
    }
}
