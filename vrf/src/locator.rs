//! Reads the VRF output of one block over a fresh chain-sync connection.

use std::sync::Arc;

use oracle_types::ChainPoint;
use tracing::{debug, info, info_span, Instrument};

use crate::session::{ChainSyncSession, Step};
use crate::transport::{SyncConnector, SyncTransport};
use crate::VrfError;

/// Roll-forward steps allowed after the intersection unless configured.
///
/// Anchored at the target's parent the target is the first forward block,
/// reached after the initial roll-backward, so a budget of one suffices.
/// The extra headroom covers endpoints that replay a few headers first.
pub const DEFAULT_STEP_BUDGET: u64 = 4;

/// Locates blocks and returns their VRF output.
///
/// Every call opens its own connection; nothing is shared between calls.
#[derive(Clone)]
pub struct VrfLocator {
    connector: Arc<dyn SyncConnector>,
    step_budget: u64,
}

impl VrfLocator {
    pub fn new(connector: Arc<dyn SyncConnector>, step_budget: u64) -> Self {
        Self {
            connector,
            step_budget,
        }
    }

    pub fn step_budget(&self) -> u64 {
        self.step_budget
    }

    /// VRF output of the block at `point`, intersecting at the point itself.
    ///
    /// A chain-sync peer answers an intersection at `point` by rolling back to
    /// it and then forward onto the *next* block, so against a real endpoint
    /// this only succeeds if the peer replays the intersection block. Callers
    /// that know the parent should use [`locate_from`](Self::locate_from).
    pub async fn locate(&self, endpoint: &str, point: &ChainPoint) -> Result<String, VrfError> {
        self.locate_from(endpoint, point, point).await
    }

    /// VRF output of `target`, intersecting at `anchor`.
    ///
    /// Passing the target's parent as `anchor` makes the target the first
    /// block rolled forward onto.
    pub async fn locate_from(
        &self,
        endpoint: &str,
        anchor: &ChainPoint,
        target: &ChainPoint,
    ) -> Result<String, VrfError> {
        let span = info_span!("chain_sync", slot = target.slot, hash = %target.hash);
        async move {
            let mut session =
                ChainSyncSession::new(anchor.clone(), target.clone(), self.step_budget);
            session.begin_connect();
            let transport = self.connector.connect(endpoint).await?;
            let mut conn = Connection::new(transport);

            drive(&mut session, &mut conn).await;
            conn.close().await;

            let outcome = session.take_outcome().unwrap_or_else(|| {
                Err(VrfError::Protocol("session ended without an outcome".into()))
            });
            match &outcome {
                Ok(_) => info!(
                    steps = session.next_block_requests(),
                    "located VRF output"
                ),
                Err(e) => debug!(error = %e, "VRF lookup failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

/// Owns the transport for the lifetime of one lookup.
///
/// `close` runs the shutdown handshake at most once. If the lookup future is
/// dropped before that (caller timeout or cancellation) the transport is
/// dropped with the guard, which releases the socket.
struct Connection {
    transport: Option<Box<dyn SyncTransport>>,
}

impl Connection {
    fn new(transport: Box<dyn SyncTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    async fn send(&mut self, frame: String) -> Result<(), VrfError> {
        match self.transport.as_mut() {
            Some(t) => t.send(frame).await,
            None => Err(VrfError::Transport("connection already closed".into())),
        }
    }

    async fn recv(&mut self) -> Result<Option<String>, VrfError> {
        match self.transport.as_mut() {
            Some(t) => t.recv().await,
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        if let Some(mut t) = self.transport.take() {
            t.close().await;
        }
    }
}

/// Pump frames between the connection and the session until it is done.
async fn drive(session: &mut ChainSyncSession, conn: &mut Connection) {
    let mut step = session.on_open();
    loop {
        match step {
            Step::Send(frame) => {
                if let Err(e) = conn.send(frame).await {
                    step = session.on_transport_error(e);
                    continue;
                }
            }
            Step::Finished => return,
            Step::Ignored => {}
        }
        if session.is_done() {
            return;
        }
        step = match conn.recv().await {
            Ok(Some(text)) => session.on_frame(&text),
            Ok(None) => session.on_transport_error(VrfError::Transport(
                "connection closed before the target block was reached".into(),
            )),
            Err(e) => session.on_transport_error(e),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned frames, one per `recv`, and records what was sent.
    #[derive(Default)]
    struct Probe {
        sent: Mutex<Vec<String>>,
        closes: AtomicUsize,
        dropped: AtomicBool,
        connects: AtomicUsize,
    }

    struct CannedTransport {
        replies: VecDeque<Result<String, VrfError>>,
        probe: Arc<Probe>,
        hang_when_empty: bool,
    }

    impl Drop for CannedTransport {
        fn drop(&mut self) {
            self.probe.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SyncTransport for CannedTransport {
        async fn send(&mut self, frame: String) -> Result<(), VrfError> {
            self.probe.sent.lock().unwrap().push(frame);
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<String>, VrfError> {
            match self.replies.pop_front() {
                Some(r) => r.map(Some),
                None if self.hang_when_empty => std::future::pending().await,
                None => Ok(None),
            }
        }

        async fn close(&mut self) {
            self.probe.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CannedConnector {
        replies: Mutex<Option<Vec<Result<String, VrfError>>>>,
        probe: Arc<Probe>,
        hang_when_empty: bool,
        refuse: bool,
    }

    impl CannedConnector {
        fn new(replies: Vec<Result<String, VrfError>>) -> (Arc<Self>, Arc<Probe>) {
            let probe = Arc::new(Probe::default());
            let connector = Arc::new(Self {
                replies: Mutex::new(Some(replies)),
                probe: probe.clone(),
                hang_when_empty: false,
                refuse: false,
            });
            (connector, probe)
        }
    }

    #[async_trait]
    impl SyncConnector for CannedConnector {
        async fn connect(&self, _endpoint: &str) -> Result<Box<dyn SyncTransport>, VrfError> {
            self.probe.connects.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return Err(VrfError::Connect("refused".into()));
            }
            let replies = self.replies.lock().unwrap().take().unwrap_or_default();
            Ok(Box::new(CannedTransport {
                replies: replies.into_iter().collect(),
                probe: self.probe.clone(),
                hang_when_empty: self.hang_when_empty,
            }))
        }
    }

    const FOUND: &str = r#"{"result":{"intersection":{"slot":100,"id":"cafe"}},"id":"find-intersection"}"#;
    const NOT_FOUND: &str = r#"{"result":{"tip":{"slot":1,"id":"aa"}},"id":"find-intersection"}"#;

    fn target() -> ChainPoint {
        ChainPoint::new(100, "cafe")
    }

    fn forward_target(id: u64) -> String {
        format!(
            r#"{{"result":{{"direction":"forward","block":{{"id":"cafe","slot":100,"issuer":{{"leaderValue":{{"output":"vrf_7a9"}}}}}}}},"id":{id}}}"#
        )
    }

    #[tokio::test]
    async fn resolves_and_closes_once() {
        let (connector, probe) = CannedConnector::new(vec![Ok(FOUND.into()), Ok(forward_target(1))]);
        let locator = VrfLocator::new(connector, 1);

        let vrf = locator.locate("ws://test", &target()).await.unwrap();
        assert_eq!(vrf, "vrf_7a9");
        assert_eq!(crate::extract(&vrf, 2), "79");
        assert_eq!(probe.closes.load(Ordering::SeqCst), 1);
        assert!(probe.dropped.load(Ordering::SeqCst));

        let sent = probe.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("findIntersection"));
        assert!(sent[1].contains("nextBlock"));
    }

    #[tokio::test]
    async fn not_found_sends_no_next_block_and_closes() {
        let (connector, probe) = CannedConnector::new(vec![Ok(NOT_FOUND.into())]);
        let locator = VrfLocator::new(connector, 4);

        let err = locator.locate("ws://test", &target()).await.unwrap_err();
        assert_eq!(err, VrfError::PointNotFound(target()));
        assert!(err.is_not_found());
        assert_eq!(probe.closes.load(Ordering::SeqCst), 1);
        let sent = probe.sent.lock().unwrap();
        assert!(sent.iter().all(|f| !f.contains("nextBlock")));
    }

    #[tokio::test]
    async fn anchored_lookup_skips_rollback() {
        let backward = r#"{"result":{"direction":"backward","point":{"slot":90,"id":"parent"}},"id":1}"#;
        let (connector, probe) = CannedConnector::new(vec![
            Ok(FOUND.into()),
            Ok(backward.into()),
            Ok(forward_target(0)),
        ]);
        let locator = VrfLocator::new(connector, 1);
        let anchor = ChainPoint::new(90, "parent");

        let vrf = locator.locate_from("ws://test", &anchor, &target()).await.unwrap();
        assert_eq!(vrf, "vrf_7a9");
        let sent = probe.sent.lock().unwrap();
        assert!(sent[0].contains(r#""id":"parent""#));
    }

    #[tokio::test]
    async fn budget_exhaustion_terminates() {
        let other = r#"{"result":{"direction":"forward","block":{"id":"next","slot":101}},"id":0}"#;
        let backward = r#"{"result":{"direction":"backward","point":"origin"},"id":1}"#;
        let (connector, probe) =
            CannedConnector::new(vec![Ok(FOUND.into()), Ok(backward.into()), Ok(other.into())]);
        let locator = VrfLocator::new(connector, 1);

        let err = locator.locate("ws://test", &target()).await.unwrap_err();
        assert!(matches!(err, VrfError::StepBudgetExceeded { budget: 1, .. }));
        assert_eq!(probe.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_error_closes_connection() {
        let (connector, probe) = CannedConnector::new(vec![
            Ok(FOUND.into()),
            Err(VrfError::Transport("reset by peer".into())),
        ]);
        let locator = VrfLocator::new(connector, 1);

        let err = locator.locate("ws://test", &target()).await.unwrap_err();
        assert_eq!(err, VrfError::Transport("reset by peer".into()));
        assert_eq!(probe.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn peer_hangup_is_transport_error() {
        let (connector, probe) = CannedConnector::new(vec![Ok(FOUND.into())]);
        let locator = VrfLocator::new(connector, 1);

        let err = locator.locate("ws://test", &target()).await.unwrap_err();
        assert!(matches!(err, VrfError::Transport(_)));
        assert_eq!(probe.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connect_failure_propagates() {
        let probe = Arc::new(Probe::default());
        let connector = Arc::new(CannedConnector {
            replies: Mutex::new(None),
            probe: probe.clone(),
            hang_when_empty: false,
            refuse: true,
        });
        let locator = VrfLocator::new(connector, 1);

        let err = locator.locate("ws://test", &target()).await.unwrap_err();
        assert!(matches!(err, VrfError::Connect(_)));
        assert_eq!(probe.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_lookup_releases_connection() {
        let probe = Arc::new(Probe::default());
        let connector = Arc::new(CannedConnector {
            replies: Mutex::new(Some(vec![Ok(FOUND.into())])),
            probe: probe.clone(),
            hang_when_empty: true,
            refuse: false,
        });
        let locator = VrfLocator::new(connector, 1);

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            locator.locate("ws://test", &target()),
        )
        .await;
        assert!(result.is_err(), "lookup should still be waiting");
        assert!(probe.dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn concurrent_lookups_use_separate_connections() {
        let (c1, p1) = CannedConnector::new(vec![Ok(FOUND.into()), Ok(forward_target(1))]);
        let (c2, p2) = CannedConnector::new(vec![Ok(NOT_FOUND.into())]);
        let l1 = VrfLocator::new(c1, 1);
        let l2 = VrfLocator::new(c2, 1);

        let (t1, t2) = (target(), target());
        let (a, b) = tokio::join!(l1.locate("ws://a", &t1), l2.locate("ws://b", &t2));
        assert!(a.is_ok());
        assert!(b.is_err());
        assert_eq!(p1.connects.load(Ordering::SeqCst), 1);
        assert_eq!(p2.connects.load(Ordering::SeqCst), 1);
    }
}
