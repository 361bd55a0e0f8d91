//! Fundamental types for the VRF oracle.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: chain points, transaction hashes, output references, request
//! identifiers, asset units and the network selector.

pub mod error;
pub mod hash;
pub mod network;
pub mod outref;
pub mod point;
pub mod request;
pub mod unit;

pub use error::TypeError;
pub use hash::TxHash;
pub use network::Network;
pub use outref::OutRef;
pub use point::ChainPoint;
pub use request::{RnLen, RngFid, MAX_FIELD_BYTES};
pub use unit::AssetUnit;
