//! On-chain record schema for the oracle.
//!
//! Two records live in script outputs:
//! - [`InitiateDatum`]: locked by the initiate transaction, names the request.
//! - [`OracleDatum`]: published by register/update, carries the random digits.
//!
//! Both are Plutus data constructor 0 values serialised as CBOR, which is what
//! the validator scripts and every off-chain Cardano library agree on.

pub mod error;
pub mod initiate;
pub mod oracle;
mod plutus;

pub use error::DatumError;
pub use initiate::InitiateDatum;
pub use oracle::OracleDatum;

/// Encode/decode a record to the ledger's CBOR representation.
pub trait DatumCodec: Sized {
    /// Serialise to Plutus data CBOR.
    fn to_cbor(&self) -> Result<Vec<u8>, DatumError>;

    /// Parse Plutus data CBOR. Trailing bytes are rejected.
    fn from_cbor(bytes: &[u8]) -> Result<Self, DatumError>;

    /// CBOR as lowercase hex, the form explorers report inline datums in.
    fn to_hex(&self) -> Result<String, DatumError> {
        Ok(hex::encode(self.to_cbor()?))
    }

    fn from_hex(s: &str) -> Result<Self, DatumError> {
        let bytes = hex::decode(s).map_err(|_| DatumError::InvalidHex)?;
        Self::from_cbor(&bytes)
    }
}
