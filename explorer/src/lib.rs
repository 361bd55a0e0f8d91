//! Ledger-explorer access for the oracle.
//!
//! The oracle never indexes the chain itself. It asks a Blockfrost-compatible
//! explorer which block contains a transaction, what that block's slot and
//! hash are, and what sits in a given transaction output.

pub mod client;
pub mod error;
pub mod resolver;

use async_trait::async_trait;
use oracle_types::{ChainPoint, Network, OutRef, TxHash};

pub use client::{BlockfrostClient, ExplorerEndpoint};
pub use error::ExplorerError;
pub use resolver::{BlockHeightResolver, ResolvedBlock};

/// A block as the explorer reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub hash: String,
    pub slot: u64,
    pub height: Option<u64>,
    /// Hash of the parent block; `None` for genesis.
    pub previous_block: Option<String>,
}

impl BlockInfo {
    pub fn point(&self) -> ChainPoint {
        ChainPoint::new(self.slot, self.hash.clone())
    }
}

/// One transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtxoInfo {
    pub out_ref: OutRef,
    /// Inline datum CBOR, if the output carries one.
    pub inline_datum: Option<Vec<u8>>,
    pub spent: bool,
}

/// Read-only ledger queries.
#[async_trait]
pub trait LedgerExplorer: Send + Sync {
    /// Height of the block that contains `tx`.
    async fn tx_block_height(&self, network: Network, tx: &TxHash) -> Result<u64, ExplorerError>;

    async fn block_by_height(&self, network: Network, height: u64)
        -> Result<BlockInfo, ExplorerError>;

    async fn block_by_hash(&self, network: Network, hash: &str) -> Result<BlockInfo, ExplorerError>;

    async fn utxo_at(&self, network: Network, out_ref: &OutRef) -> Result<UtxoInfo, ExplorerError>;
}
