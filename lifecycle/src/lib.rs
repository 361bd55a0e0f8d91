//! Oracle lifecycle: initiate a request, register and update the oracle
//! that answers it, query the published digits.

pub mod controller;
pub mod error;
pub mod request;
pub mod tx;

pub use controller::{OracleController, DEFAULT_LOOKUP_TIMEOUT};
pub use error::OracleError;
pub use request::{
    ChainSyncUrl, InitiateReceipt, InitiateRequest, OracleReceipt, OracleRequest, ScriptHex,
    Submitter, WalletSeed,
};
pub use tx::{HttpTxBuilder, LockedInitiate, TxBuilder, TxError};
