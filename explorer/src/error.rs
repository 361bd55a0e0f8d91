use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    /// The explorer answered but has no such record (HTTP 404 or a missing field).
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport failure, timeout or an unexpected HTTP status.
    #[error("explorer unavailable: {0}")]
    Unavailable(String),

    #[error("invalid explorer response: {0}")]
    InvalidResponse(String),
}

impl ExplorerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
