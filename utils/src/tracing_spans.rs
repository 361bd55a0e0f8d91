//! Span constructors shared across the oracle crates.
//!
//! Consistent names and field sets keep lifecycle operations and chain-sync
//! sessions easy to correlate in aggregated logs.

use tracing::{field, info_span, Span};

/// One lifecycle operation (`initiate`, `register`, `update`, `query`).
///
/// `rngfid` starts empty; query only learns it from the datum it reads.
pub fn oracle_op_span(op: &str) -> Span {
    info_span!("oracle_op", op = %op, rngfid = field::Empty)
}

/// One HTTP request handled by the API server.
pub fn http_span(method: &str, path: &str) -> Span {
    info_span!("http", method = %method, path = %path)
}
