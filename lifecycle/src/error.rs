use oracle_datum::DatumError;
use oracle_explorer::ExplorerError;
use oracle_types::TypeError;
use oracle_vrf::VrfError;
use thiserror::Error;

use crate::tx::TxError;

/// Every way a lifecycle operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The request itself is malformed or contradicts on-chain state.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The target block was not reached within the chain-sync step budget.
    #[error("VRF lookup gave up: {0}")]
    StepBudgetExceeded(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An upstream answered with something unusable.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl OracleError {
    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::StepBudgetExceeded(_) => "step_budget_exceeded",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::Protocol(_) => "protocol",
        }
    }
}

impl From<TypeError> for OracleError {
    fn from(e: TypeError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<DatumError> for OracleError {
    fn from(e: DatumError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<ExplorerError> for OracleError {
    fn from(e: ExplorerError) -> Self {
        match e {
            ExplorerError::NotFound(what) => Self::NotFound(what),
            ExplorerError::Unavailable(msg) => Self::UpstreamUnavailable(format!("explorer: {msg}")),
            ExplorerError::InvalidResponse(msg) => Self::Protocol(format!("explorer: {msg}")),
        }
    }
}

impl From<VrfError> for OracleError {
    fn from(e: VrfError) -> Self {
        match e {
            VrfError::PointNotFound(point) => {
                Self::NotFound(format!("block {point} not found by chain-sync endpoint"))
            }
            e @ VrfError::StepBudgetExceeded { .. } => Self::StepBudgetExceeded(e.to_string()),
            VrfError::Protocol(msg) => Self::Protocol(msg),
            e @ (VrfError::Connect(_) | VrfError::Transport(_)) => {
                Self::UpstreamUnavailable(e.to_string())
            }
        }
    }
}

impl From<TxError> for OracleError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Unavailable(msg) => Self::UpstreamUnavailable(format!("tx service: {msg}")),
            TxError::Rejected(msg) => Self::Protocol(format!("transaction rejected: {msg}")),
            TxError::InvalidResponse(msg) => Self::Protocol(format!("tx service: {msg}")),
        }
    }
}
