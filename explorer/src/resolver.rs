//! Transaction id → chain point.

use std::sync::Arc;

use oracle_types::{ChainPoint, Network, TxHash};
use tracing::{debug, warn};

use crate::{ExplorerError, LedgerExplorer};

/// The block containing a transaction, and its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub target: ChainPoint,
    pub parent: ChainPoint,
}

impl ResolvedBlock {
    /// Where a chain-sync intersection should be requested.
    ///
    /// A chain-sync peer rolls forward onto the block after the intersection,
    /// so the anchor is always the parent.
    pub fn anchor(&self) -> &ChainPoint {
        &self.parent
    }
}

/// Maps a transaction id to the slot and hash of its block.
///
/// Two explorer round trips: the transaction's block height, then the block
/// at that height. No retries.
#[derive(Clone)]
pub struct BlockHeightResolver {
    explorer: Arc<dyn LedgerExplorer>,
}

impl BlockHeightResolver {
    pub fn new(explorer: Arc<dyn LedgerExplorer>) -> Self {
        Self { explorer }
    }

    pub async fn resolve(&self, network: Network, tx: &TxHash) -> Result<ChainPoint, ExplorerError> {
        let height = self.explorer.tx_block_height(network, tx).await?;
        let block = self.explorer.block_by_height(network, height).await?;
        debug!(%tx, height, slot = block.slot, hash = %block.hash, "resolved transaction block");
        Ok(block.point())
    }

    /// Like [`resolve`](Self::resolve), also looking up the parent block.
    ///
    /// A block without a parent the explorer can find is `NotFound`: its VRF
    /// output cannot be reached by rolling forward.
    pub async fn resolve_anchored(
        &self,
        network: Network,
        tx: &TxHash,
    ) -> Result<ResolvedBlock, ExplorerError> {
        let height = self.explorer.tx_block_height(network, tx).await?;
        let block = self.explorer.block_by_height(network, height).await?;
        let target = block.point();

        let Some(prev) = block.previous_block else {
            warn!(%target, "block has no parent");
            return Err(ExplorerError::NotFound(format!("parent of block {}", target.hash)));
        };
        let parent = match self.explorer.block_by_hash(network, &prev).await {
            Ok(parent) => parent.point(),
            Err(ExplorerError::NotFound(what)) => {
                warn!(%target, %what, "parent block not found");
                return Err(ExplorerError::NotFound(format!("parent of block {}", target.hash)));
            }
            Err(e) => return Err(e),
        };

        debug!(%tx, height, %target, %parent, "resolved transaction block");
        Ok(ResolvedBlock { target, parent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockInfo, UtxoInfo};
    use async_trait::async_trait;
    use oracle_types::OutRef;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapExplorer {
        heights: HashMap<TxHash, u64>,
        blocks: Vec<BlockInfo>,
        down: bool,
    }

    #[async_trait]
    impl LedgerExplorer for MapExplorer {
        async fn tx_block_height(&self, _: Network, tx: &TxHash) -> Result<u64, ExplorerError> {
            if self.down {
                return Err(ExplorerError::Unavailable("down".into()));
            }
            self.heights
                .get(tx)
                .copied()
                .ok_or_else(|| ExplorerError::NotFound(tx.to_string()))
        }

        async fn block_by_height(&self, _: Network, height: u64) -> Result<BlockInfo, ExplorerError> {
            self.blocks
                .iter()
                .find(|b| b.height == Some(height))
                .cloned()
                .ok_or_else(|| ExplorerError::NotFound(height.to_string()))
        }

        async fn block_by_hash(&self, _: Network, hash: &str) -> Result<BlockInfo, ExplorerError> {
            self.blocks
                .iter()
                .find(|b| b.hash == hash)
                .cloned()
                .ok_or_else(|| ExplorerError::NotFound(hash.to_string()))
        }

        async fn utxo_at(&self, _: Network, out_ref: &OutRef) -> Result<UtxoInfo, ExplorerError> {
            Err(ExplorerError::NotFound(out_ref.to_string()))
        }
    }

    fn block(hash: &str, slot: u64, height: u64, prev: Option<&str>) -> BlockInfo {
        BlockInfo {
            hash: hash.into(),
            slot,
            height: Some(height),
            previous_block: prev.map(Into::into),
        }
    }

    fn tx(n: u8) -> TxHash {
        TxHash::new([n; 32])
    }

    fn explorer() -> MapExplorer {
        let mut e = MapExplorer::default();
        e.heights.insert(tx(1), 11);
        e.heights.insert(tx(2), 12);
        e.heights.insert(tx(3), 10);
        e.blocks.push(block("b10", 100, 10, None));
        e.blocks.push(block("b11", 120, 11, Some("b10")));
        e.blocks.push(block("b12", 140, 12, Some("gone")));
        e
    }

    #[tokio::test]
    async fn resolves_tx_to_point() {
        let r = BlockHeightResolver::new(Arc::new(explorer()));
        let point = r.resolve(Network::Preprod, &tx(1)).await.unwrap();
        assert_eq!(point, ChainPoint::new(120, "b11"));
    }

    #[tokio::test]
    async fn anchored_includes_parent() {
        let r = BlockHeightResolver::new(Arc::new(explorer()));
        let resolved = r.resolve_anchored(Network::Preprod, &tx(1)).await.unwrap();
        assert_eq!(resolved.target, ChainPoint::new(120, "b11"));
        assert_eq!(resolved.anchor(), &ChainPoint::new(100, "b10"));
    }

    #[tokio::test]
    async fn unknown_parent_is_not_found() {
        let r = BlockHeightResolver::new(Arc::new(explorer()));
        let err = r.resolve_anchored(Network::Preprod, &tx(2)).await.unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
    }

    #[tokio::test]
    async fn block_without_parent_is_not_found() {
        let r = BlockHeightResolver::new(Arc::new(explorer()));
        let err = r.resolve_anchored(Network::Preprod, &tx(3)).await.unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
        // The plain lookup does not need the parent.
        let point = r.resolve(Network::Preprod, &tx(3)).await.unwrap();
        assert_eq!(point, ChainPoint::new(100, "b10"));
    }

    #[tokio::test]
    async fn unknown_tx_is_not_found() {
        let r = BlockHeightResolver::new(Arc::new(explorer()));
        let err = r.resolve(Network::Preprod, &tx(9)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn outage_propagates() {
        let e = MapExplorer {
            down: true,
            ..explorer()
        };
        let r = BlockHeightResolver::new(Arc::new(e));
        let err = r.resolve_anchored(Network::Preprod, &tx(1)).await.unwrap_err();
        assert!(matches!(err, ExplorerError::Unavailable(_)));
    }
}
