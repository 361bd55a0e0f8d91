//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the oracle (ledger explorer, transaction
//! service, chain-sync endpoint) has an in-memory stand-in here that:
//! - returns deterministic values,
//! - can be configured and inspected programmatically,
//! - never touches the network.

pub mod chain_sync;
pub mod explorer;
pub mod tx_builder;

pub use chain_sync::{NullChainSync, SyncStats};
pub use explorer::NullExplorer;
pub use tx_builder::{NullTxBuilder, TxCall};
