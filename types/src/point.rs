//! Chain points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An exact position on the chain: the slot a block was minted in plus the
/// block's header hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainPoint {
    pub slot: u64,
    pub hash: String,
}

impl ChainPoint {
    pub fn new(slot: u64, hash: impl Into<String>) -> Self {
        Self {
            slot,
            hash: hash.into(),
        }
    }

    /// Whether a block reported at `slot` with header `hash` is this point.
    pub fn is(&self, slot: u64, hash: &str) -> bool {
        self.slot == slot && self.hash == hash
    }
}

impl fmt::Display for ChainPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.hash, self.slot)
    }
}
