//! Duplex connections for the chain-sync protocol.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::VrfError;

/// One open connection to a chain-sync endpoint.
///
/// Dropping a transport releases the underlying socket; [`close`] performs
/// the orderly shutdown handshake first.
///
/// [`close`]: SyncTransport::close
#[async_trait]
pub trait SyncTransport: Send {
    async fn send(&mut self, frame: String) -> Result<(), VrfError>;

    /// Next text frame, or `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Result<Option<String>, VrfError>;

    async fn close(&mut self);
}

/// Opens a fresh [`SyncTransport`] per lookup.
#[async_trait]
pub trait SyncConnector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn SyncTransport>, VrfError>;
}

/// WebSocket connector (Ogmios speaks JSON-RPC over WebSocket).
#[derive(Clone, Debug, Default)]
pub struct WsConnector;

#[async_trait]
impl SyncConnector for WsConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn SyncTransport>, VrfError> {
        let (stream, _response) = tokio_tungstenite::connect_async(endpoint)
            .await
            .map_err(|e| VrfError::Connect(format!("{endpoint}: {e}")))?;
        debug!(endpoint, "chain-sync connection open");
        Ok(Box::new(WsTransport { stream }))
    }
}

struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl SyncTransport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), VrfError> {
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| VrfError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<String>, VrfError> {
        while let Some(msg) = self.stream.next().await {
            match msg.map_err(|e| VrfError::Transport(e.to_string()))? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Binary(bytes) => {
                    let text = String::from_utf8(bytes)
                        .map_err(|_| VrfError::Protocol("binary frame is not UTF-8".into()))?;
                    return Ok(Some(text));
                }
                Message::Close(frame) => {
                    debug!(?frame, "chain-sync endpoint closed the connection");
                    return Ok(None);
                }
                // Pings are answered by tungstenite on the next read or write.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            warn!("chain-sync close handshake failed: {e}");
        }
    }
}
