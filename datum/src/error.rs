use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatumError {
    #[error("datum encoding failed: {0}")]
    Encode(String),

    #[error("datum decoding failed: {0}")]
    Decode(String),

    #[error("{0} trailing bytes after datum")]
    TrailingBytes(usize),

    #[error("{field} must be at most {max} bytes, got {len}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("rnlen must be between 1 and 8, got {0}")]
    RnLenOutOfRange(u64),

    #[error("rngoutput must be 1 to 8 ASCII digits, got {0:?}")]
    InvalidRngOutput(String),

    #[error("datum is not valid hex")]
    InvalidHex,

    #[error("{0} is not valid UTF-8 text")]
    NotText(&'static str),
}
