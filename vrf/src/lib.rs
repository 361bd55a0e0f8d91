//! Randomness source for the oracle: the VRF output of a specific block.
//!
//! - [`digits`]: shapes a raw VRF output into a fixed number of decimal digits.
//! - [`protocol`]: JSON-RPC frames of the chain-sync mini-protocol.
//! - [`session`]: the sans-IO state machine driving one chain-sync exchange.
//! - [`transport`]: the duplex connection the session runs over (WebSocket).
//! - [`locator`]: opens a connection, drives a session to completion, closes.

pub mod digits;
pub mod error;
pub mod locator;
pub mod protocol;
pub mod session;
pub mod transport;

pub use digits::extract;
pub use error::VrfError;
pub use locator::{VrfLocator, DEFAULT_STEP_BUDGET};
pub use protocol::{BlockEnvelope, BlockHeader, Direction, Reply};
pub use session::{ChainSyncSession, Phase, Step};
pub use transport::{SyncConnector, SyncTransport, WsConnector};
