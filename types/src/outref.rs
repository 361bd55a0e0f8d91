//! Transaction output references.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TxHash;

/// Points at one output of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutRef {
    pub tx_hash: TxHash,
    pub index: u32,
}

impl OutRef {
    pub fn new(tx_hash: TxHash, index: u32) -> Self {
        Self { tx_hash, index }
    }

    /// The output an oracle or initiate transaction pays its datum to.
    ///
    /// Lifecycle transactions always place the script output first.
    pub fn first(tx_hash: TxHash) -> Self {
        Self { tx_hash, index: 0 }
    }
}

impl fmt::Display for OutRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.index)
    }
}
