//! Validated inputs and outputs of the lifecycle operations.

use std::fmt;

use oracle_types::{AssetUnit, Network, RnLen, RngFid, TxHash};

use crate::OracleError;

/// Mnemonic phrase lengths the wallet service accepts.
const SEED_WORD_COUNTS: [usize; 3] = [12, 15, 24];

/// A wallet mnemonic. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletSeed(String);

impl WalletSeed {
    pub fn new(phrase: &str) -> Result<Self, OracleError> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if !SEED_WORD_COUNTS.contains(&words.len()) {
            return Err(OracleError::Validation(format!(
                "walletSeed must have 12, 15 or 24 words, got {}",
                words.len()
            )));
        }
        Ok(Self(words.join(" ")))
    }

    pub fn phrase(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WalletSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WalletSeed(<redacted>)")
    }
}

/// A compiled validator script, CBOR hex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptHex(String);

impl ScriptHex {
    pub fn new(cbor_hex: &str) -> Result<Self, OracleError> {
        let s = cbor_hex.trim();
        if s.is_empty() || hex::decode(s).is_err() {
            return Err(OracleError::Validation(
                "CBORhex must be non-empty hex".into(),
            ));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// WebSocket URL of a chain-sync endpoint.
///
/// `http`/`https` are accepted and rewritten to `ws`/`wss`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainSyncUrl(String);

impl ChainSyncUrl {
    pub fn new(url: &str) -> Result<Self, OracleError> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| OracleError::Validation(format!("ogmiosUrl {url:?} is not a URL")))?;
        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "ws" | "http" => "ws",
            "wss" | "https" => "wss",
            other => {
                return Err(OracleError::Validation(format!(
                    "ogmiosUrl scheme {other:?} is not supported"
                )))
            }
        };
        if rest.is_empty() || rest.starts_with('/') {
            return Err(OracleError::Validation(format!("ogmiosUrl {url:?} has no host")));
        }
        Ok(Self(format!("{scheme}://{rest}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainSyncUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Network, wallet and script: the context every ledger write runs in.
#[derive(Clone, Debug)]
pub struct Submitter {
    pub network: Network,
    pub wallet: WalletSeed,
    pub script: ScriptHex,
}

#[derive(Clone, Debug)]
pub struct InitiateRequest {
    pub submitter: Submitter,
    /// Generated per call when absent.
    pub rngfid: Option<RngFid>,
    pub rnlen: RnLen,
}

/// Shared by register and update.
#[derive(Clone, Debug)]
pub struct OracleRequest {
    pub submitter: Submitter,
    pub chain_sync: ChainSyncUrl,
    pub rngfid: RngFid,
    pub rnlen: RnLen,
    /// The initiate transaction; its block supplies the randomness.
    pub seed_tx: TxHash,
    pub unit: AssetUnit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitiateReceipt {
    pub tx_hash: TxHash,
    /// InitiateDatum CBOR, hex.
    pub datum: String,
    pub rngfid: RngFid,
    pub rnlen: RnLen,
    pub unit: AssetUnit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleReceipt {
    pub tx_hash: TxHash,
    pub unit: AssetUnit,
    pub rng_output: String,
}
