//! HTTP API for the oracle.
//!
//! | Route | Operation |
//! |---|---|
//! | `POST /initiate` | lock a new randomness request |
//! | `POST /register` | publish the first oracle datum |
//! | `POST /update` | supersede the current oracle datum |
//! | `POST /query` | read the published digits |
//! | `GET /health` | liveness |
//!
//! Every response is an envelope: `{data, success: true}` or
//! `{error, data: null, success: false}`.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, AppState, RpcServer};
