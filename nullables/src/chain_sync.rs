//! Nullable chain-sync endpoint.
//!
//! Holds a short in-memory chain and answers `findIntersection` and
//! `nextBlock` the way a real endpoint does: the first `nextBlock` after an
//! intersection rolls backward onto it, later ones roll forward one block at
//! a time. At the tip it stops answering, like an endpoint waiting for the
//! next block.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use oracle_types::ChainPoint;
use oracle_vrf::{SyncConnector, SyncTransport, VrfError};
use serde_json::{json, Value};

#[derive(Clone, Debug)]
struct ChainBlock {
    point: ChainPoint,
    vrf: Option<String>,
}

/// Connection counters shared by every transport a [`NullChainSync`] opens.
#[derive(Default, Debug)]
pub struct SyncStats {
    connects: AtomicUsize,
    closes: AtomicUsize,
    drops: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl SyncStats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Orderly closes.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Transports released, whether closed first or not.
    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    /// Every frame sent by clients, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn next_block_requests(&self) -> usize {
        self.sent().iter().filter(|f| f.contains("\"nextBlock\"")).count()
    }
}

#[derive(Clone, Default)]
pub struct NullChainSync {
    chain: Vec<ChainBlock>,
    stats: Arc<SyncStats>,
    refuse: bool,
    stalled: bool,
}

impl NullChainSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block; `vrf` is its leader VRF output (None for Byron-style
    /// blocks without one).
    pub fn with_block(mut self, point: ChainPoint, vrf: Option<&str>) -> Self {
        self.chain.push(ChainBlock {
            point,
            vrf: vrf.map(str::to_string),
        });
        self
    }

    /// Every connection attempt fails.
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    /// Connections open but no frame is ever answered.
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    pub fn stats(&self) -> Arc<SyncStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl SyncConnector for NullChainSync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn SyncTransport>, VrfError> {
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(VrfError::Connect(format!("{endpoint}: connection refused")));
        }
        Ok(Box::new(NullTransport {
            chain: self.chain.clone(),
            stats: self.stats.clone(),
            stalled: self.stalled,
            cursor: None,
            rolled_back: false,
            outbox: VecDeque::new(),
        }))
    }
}

struct NullTransport {
    chain: Vec<ChainBlock>,
    stats: Arc<SyncStats>,
    stalled: bool,
    cursor: Option<usize>,
    rolled_back: bool,
    outbox: VecDeque<String>,
}

impl NullTransport {
    fn tip(&self) -> Value {
        match self.chain.last() {
            Some(b) => json!({ "slot": b.point.slot, "id": b.point.hash }),
            None => json!("origin"),
        }
    }

    fn answer(&mut self, request: &Value) -> Option<Value> {
        let id = request["id"].clone();
        match request["method"].as_str() {
            Some("findIntersection") => {
                let point = &request["params"]["points"][0];
                let found = self.chain.iter().position(|b| {
                    point["slot"].as_u64() == Some(b.point.slot)
                        && point["id"].as_str() == Some(b.point.hash.as_str())
                });
                Some(match found {
                    Some(i) => {
                        self.cursor = Some(i);
                        self.rolled_back = false;
                        let p = &self.chain[i].point;
                        json!({
                            "jsonrpc": "2.0",
                            "method": "findIntersection",
                            "result": {
                                "intersection": { "slot": p.slot, "id": p.hash },
                                "tip": self.tip(),
                            },
                            "id": id,
                        })
                    }
                    None => json!({
                        "jsonrpc": "2.0",
                        "method": "findIntersection",
                        "error": {
                            "code": 1000,
                            "message": "No intersection found.",
                            "data": { "tip": self.tip() },
                        },
                        "id": id,
                    }),
                })
            }
            Some("nextBlock") => {
                let cursor = self.cursor?;
                let result = if !self.rolled_back {
                    self.rolled_back = true;
                    let p = &self.chain[cursor].point;
                    json!({
                        "direction": "backward",
                        "point": { "slot": p.slot, "id": p.hash },
                        "tip": self.tip(),
                    })
                } else {
                    let next = self.chain.get(cursor + 1)?.clone();
                    self.cursor = Some(cursor + 1);
                    let mut block = json!({
                        "type": "praos",
                        "era": "babbage",
                        "id": next.point.hash,
                        "slot": next.point.slot,
                        "height": cursor + 1,
                    });
                    if let Some(vrf) = next.vrf {
                        block["issuer"] = json!({ "leaderValue": { "output": vrf } });
                    }
                    json!({ "direction": "forward", "block": block, "tip": self.tip() })
                };
                Some(json!({
                    "jsonrpc": "2.0",
                    "method": "nextBlock",
                    "result": result,
                    "id": id,
                }))
            }
            _ => Some(json!({
                "jsonrpc": "2.0",
                "error": { "code": -32601, "message": "Method not found" },
                "id": id,
            })),
        }
    }
}

#[async_trait]
impl SyncTransport for NullTransport {
    async fn send(&mut self, frame: String) -> Result<(), VrfError> {
        self.stats
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.clone());
        if self.stalled {
            return Ok(());
        }
        let request: Value = serde_json::from_str(&frame)
            .map_err(|e| VrfError::Transport(format!("unparseable request: {e}")))?;
        if let Some(reply) = self.answer(&request) {
            self.outbox.push_back(reply.to_string());
        }
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, VrfError> {
        match self.outbox.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for NullTransport {
    fn drop(&mut self) {
        self.stats.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_vrf::VrfLocator;
    use std::time::Duration;

    fn chain() -> NullChainSync {
        NullChainSync::new()
            .with_block(ChainPoint::new(10, "aa"), Some("0xf00"))
            .with_block(ChainPoint::new(20, "bb"), Some("vrf_7a9"))
            .with_block(ChainPoint::new(30, "cc"), None)
    }

    #[tokio::test]
    async fn anchored_at_parent_reaches_target_first() {
        let sync = chain();
        let stats = sync.stats();
        let locator = VrfLocator::new(Arc::new(sync), 1);

        let vrf = locator
            .locate_from("ws://null", &ChainPoint::new(10, "aa"), &ChainPoint::new(20, "bb"))
            .await
            .unwrap();
        assert_eq!(vrf, "vrf_7a9");
        assert_eq!(stats.connects(), 1);
        assert_eq!(stats.closes(), 1);
        assert_eq!(stats.drops(), 1);
        assert_eq!(stats.next_block_requests(), 2);
    }

    #[tokio::test]
    async fn unknown_point_is_not_found() {
        let sync = chain();
        let stats = sync.stats();
        let locator = VrfLocator::new(Arc::new(sync), 4);

        let err = locator
            .locate("ws://null", &ChainPoint::new(99, "zz"))
            .await
            .unwrap_err();
        assert!(matches!(err, VrfError::PointNotFound(_)));
        assert_eq!(stats.next_block_requests(), 0);
        assert_eq!(stats.closes(), 1);
    }

    #[tokio::test]
    async fn block_without_vrf_is_protocol_error() {
        let locator = VrfLocator::new(Arc::new(chain()), 4);
        let err = locator
            .locate_from("ws://null", &ChainPoint::new(20, "bb"), &ChainPoint::new(30, "cc"))
            .await
            .unwrap_err();
        assert!(matches!(err, VrfError::Protocol(_)));
    }

    #[tokio::test]
    async fn stalled_endpoint_is_released_on_timeout() {
        let sync = chain().stalled();
        let stats = sync.stats();
        let locator = VrfLocator::new(Arc::new(sync), 4);

        let point = ChainPoint::new(20, "bb");
        let lookup = locator.locate("ws://null", &point);
        assert!(tokio::time::timeout(Duration::from_millis(20), lookup).await.is_err());
        assert_eq!(stats.drops(), 1);
        assert_eq!(stats.closes(), 0);
    }
}
