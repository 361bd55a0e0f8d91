//! Oracle request identifiers and parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// Upper bound on `rngfid`, `initiator` and `publisher` datum fields.
pub const MAX_FIELD_BYTES: usize = 32;

/// Shortest caller-supplied request id accepted.
pub const MIN_RNGFID_CHARS: usize = 4;

const GENERATED_PREFIX: &str = "rngfid_";
const GENERATED_HEX_CHARS: usize = 17;

/// Identifies one logical oracle request from initiate through every update.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RngFid(String);

impl RngFid {
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.len() > MAX_FIELD_BYTES {
            return Err(TypeError::FieldTooLong {
                field: "rngfid",
                len: value.len(),
                max: MAX_FIELD_BYTES,
            });
        }
        if value.chars().count() < MIN_RNGFID_CHARS {
            return Err(TypeError::FieldTooShort {
                field: "rngfid",
                len: value.chars().count(),
                min: MIN_RNGFID_CHARS,
            });
        }
        Ok(Self(value))
    }

    /// Draw a fresh id of the form `rngfid_<17 hex chars>`.
    ///
    /// Called once per initiate request that does not name its own id.
    pub fn generate() -> Result<Self, TypeError> {
        let mut buf = [0u8; 10];
        getrandom::getrandom(&mut buf).map_err(|e| TypeError::Entropy(e.to_string()))?;
        let mut id = hex::encode(&buf);
        id.truncate(GENERATED_HEX_CHARS);
        Ok(Self(format!("{GENERATED_PREFIX}{id}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl TryFrom<String> for RngFid {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RngFid> for String {
    fn from(id: RngFid) -> Self {
        id.0
    }
}

impl fmt::Display for RngFid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of random digits requested, always in `1..=8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RnLen(u8);

impl RnLen {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(value: u64) -> Result<Self, TypeError> {
        if (Self::MIN as u64..=Self::MAX as u64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(TypeError::RnLenOutOfRange(value))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u64> for RnLen {
    type Error = TypeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RnLen> for u64 {
    fn from(len: RnLen) -> Self {
        len.0 as u64
    }
}
