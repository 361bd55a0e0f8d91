//! API errors and their HTTP representation.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oracle_lifecycle::OracleError;
use oracle_types::TypeError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RpcError {
    /// The body could not be parsed or a field failed validation.
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Oracle(e) => match e {
                OracleError::Validation(_) => StatusCode::BAD_REQUEST,
                OracleError::NotFound(_) | OracleError::StepBudgetExceeded(_) => {
                    StatusCode::NOT_FOUND
                }
                OracleError::UpstreamUnavailable(_) | OracleError::Protocol(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "validation",
            Self::Oracle(e) => e.kind(),
        }
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<TypeError> for RpcError {
    fn from(e: TypeError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(kind = self.kind(), "request failed: {self}");
        } else {
            debug!(kind = self.kind(), "request rejected: {self}");
        }
        let body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "data": null,
            "success": false,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (OracleError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (OracleError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (OracleError::StepBudgetExceeded("x".into()), StatusCode::NOT_FOUND),
            (OracleError::UpstreamUnavailable("x".into()), StatusCode::BAD_GATEWAY),
            (OracleError::Protocol("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(RpcError::from(err).status(), status);
        }
        assert_eq!(
            RpcError::InvalidRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn budget_and_not_found_share_status_but_not_kind() {
        let a = RpcError::from(OracleError::NotFound("x".into()));
        let b = RpcError::from(OracleError::StepBudgetExceeded("x".into()));
        assert_eq!(a.status(), b.status());
        assert_ne!(a.kind(), b.kind());
    }
}
