//! Validation errors for the shared value types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("rnlen must be between 1 and 8, got {0}")]
    RnLenOutOfRange(u64),

    #[error("{field} must be at most {max} bytes, got {len}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} must be at least {min} characters, got {len}")]
    FieldTooShort {
        field: &'static str,
        len: usize,
        min: usize,
    },

    #[error("unknown network id {0} (expected 0 = preprod, 1 = mainnet)")]
    UnknownNetwork(u8),

    #[error("invalid hex in {field}")]
    InvalidHex { field: &'static str },

    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}
