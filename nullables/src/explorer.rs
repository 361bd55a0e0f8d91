//! Nullable ledger explorer backed by in-memory maps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use oracle_explorer::{BlockInfo, ExplorerError, LedgerExplorer, UtxoInfo};
use oracle_types::{Network, OutRef, TxHash};

#[derive(Default)]
pub struct NullExplorer {
    tx_heights: Mutex<HashMap<TxHash, u64>>,
    blocks: Mutex<Vec<BlockInfo>>,
    utxos: Mutex<HashMap<OutRef, UtxoInfo>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl NullExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tx` as confirmed in the block at `height`.
    pub fn add_tx(&self, tx: TxHash, height: u64) {
        self.tx_heights.lock().unwrap_or_else(PoisonError::into_inner).insert(tx, height);
    }

    pub fn add_block(&self, block: BlockInfo) {
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner).push(block);
    }

    /// Add or replace an output.
    pub fn put_utxo(&self, out_ref: OutRef, inline_datum: Option<Vec<u8>>, spent: bool) {
        self.utxos.lock().unwrap_or_else(PoisonError::into_inner).insert(
            out_ref,
            UtxoInfo {
                out_ref,
                inline_datum,
                spent,
            },
        );
    }

    /// Make every subsequent call fail with [`ExplorerError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of queries served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), ExplorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ExplorerError::Unavailable("null explorer offline".into()));
        }
        Ok(())
    }

    fn find_block(&self, pred: impl Fn(&BlockInfo) -> bool) -> Option<BlockInfo> {
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner).iter().find(|b| pred(b)).cloned()
    }
}

#[async_trait]
impl LedgerExplorer for NullExplorer {
    async fn tx_block_height(&self, _network: Network, tx: &TxHash) -> Result<u64, ExplorerError> {
        self.enter()?;
        self.tx_heights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tx)
            .copied()
            .ok_or_else(|| ExplorerError::NotFound(format!("/txs/{tx}")))
    }

    async fn block_by_height(
        &self,
        _network: Network,
        height: u64,
    ) -> Result<BlockInfo, ExplorerError> {
        self.enter()?;
        self.find_block(|b| b.height == Some(height))
            .ok_or_else(|| ExplorerError::NotFound(format!("/blocks/{height}")))
    }

    async fn block_by_hash(&self, _network: Network, hash: &str) -> Result<BlockInfo, ExplorerError> {
        self.enter()?;
        self.find_block(|b| b.hash == hash)
            .ok_or_else(|| ExplorerError::NotFound(format!("/blocks/{hash}")))
    }

    async fn utxo_at(&self, _network: Network, out_ref: &OutRef) -> Result<UtxoInfo, ExplorerError> {
        self.enter()?;
        self.utxos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(out_ref)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(format!("output {out_ref}")))
    }
}
