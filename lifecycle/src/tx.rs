//! Ledger writes, delegated to an external transaction service.
//!
//! Building, balancing, signing and submitting transactions is not done
//! here. The controller hands a finished datum to a [`TxBuilder`] and gets a
//! transaction hash back.

use std::time::Duration;

use async_trait::async_trait;
use oracle_datum::{DatumCodec, InitiateDatum, OracleDatum};
use oracle_types::{AssetUnit, OutRef, RngFid, TxHash};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::request::Submitter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("transaction service unavailable: {0}")]
    Unavailable(String),

    /// The service refused to build or submit the transaction.
    #[error("{0}")]
    Rejected(String),

    #[error("invalid response from transaction service: {0}")]
    InvalidResponse(String),
}

/// Result of locking an initiate datum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockedInitiate {
    pub tx_hash: TxHash,
    /// Policy of the request token minted alongside the lock.
    pub policy_id: String,
}

#[async_trait]
pub trait TxBuilder: Send + Sync {
    /// Payment key hash of the submitter's wallet.
    async fn payment_key_hash(&self, submitter: &Submitter) -> Result<Vec<u8>, TxError>;

    /// Mint the request token named `rngfid` and lock it with `datum` at the
    /// submitter's script.
    async fn lock_initiate(
        &self,
        submitter: &Submitter,
        datum: &InitiateDatum,
        rngfid: &RngFid,
    ) -> Result<LockedInitiate, TxError>;

    /// Pay `unit` to the script with `datum` inline.
    async fn publish_oracle(
        &self,
        submitter: &Submitter,
        datum: &OracleDatum,
        unit: &AssetUnit,
    ) -> Result<TxHash, TxError>;

    /// Spend `prior` and pay `unit` back to the script with `datum` inline.
    async fn supersede_oracle(
        &self,
        submitter: &Submitter,
        prior: &OutRef,
        datum: &OracleDatum,
        unit: &AssetUnit,
    ) -> Result<TxHash, TxError>;
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// [`TxBuilder`] over a JSON/HTTP transaction service.
///
/// | Call | Endpoint | Response |
/// |---|---|---|
/// | `payment_key_hash` | `POST /wallet/key-hash` | `{keyHash}` |
/// | `lock_initiate` | `POST /initiate` | `{txHash, policyId}` |
/// | `publish_oracle` | `POST /oracle/publish` | `{txHash}` |
/// | `supersede_oracle` | `POST /oracle/supersede` | `{txHash}` |
pub struct HttpTxBuilder {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletBody<'a> {
    network: u8,
    wallet_seed: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteBody<'a> {
    network: u8,
    wallet_seed: &'a str,
    script: &'a str,
    datum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prior: Option<PriorBody>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriorBody {
    tx_hash: String,
    output_index: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyHashResponse {
    key_hash: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxResponse {
    tx_hash: TxHash,
    #[serde(default)]
    policy_id: Option<String>,
}

impl HttpTxBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TxError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(%url, "tx service request");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TxError::Unavailable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    TxError::Unavailable(format!("connection failed: {e}"))
                } else {
                    TxError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_client_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(TxError::Rejected(format!("HTTP status {status}: {text}")));
        }
        if !status.is_success() {
            return Err(TxError::Unavailable(format!("HTTP status {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| TxError::InvalidResponse(format!("failed to parse {path} response: {e}")))
    }

    fn write_body<'a>(submitter: &'a Submitter, datum: String) -> WriteBody<'a> {
        WriteBody {
            network: submitter.network.into(),
            wallet_seed: submitter.wallet.phrase(),
            script: submitter.script.as_str(),
            datum,
            asset_name: None,
            unit: None,
            prior: None,
        }
    }
}

fn datum_hex<D: DatumCodec>(datum: &D) -> Result<String, TxError> {
    datum
        .to_hex()
        .map_err(|e| TxError::Rejected(format!("datum cannot be encoded: {e}")))
}

#[async_trait]
impl TxBuilder for HttpTxBuilder {
    async fn payment_key_hash(&self, submitter: &Submitter) -> Result<Vec<u8>, TxError> {
        let body = WalletBody {
            network: submitter.network.into(),
            wallet_seed: submitter.wallet.phrase(),
        };
        let resp: KeyHashResponse = self.post("/wallet/key-hash", &body).await?;
        hex::decode(&resp.key_hash)
            .map_err(|_| TxError::InvalidResponse("keyHash is not hex".into()))
    }

    async fn lock_initiate(
        &self,
        submitter: &Submitter,
        datum: &InitiateDatum,
        rngfid: &RngFid,
    ) -> Result<LockedInitiate, TxError> {
        let mut body = Self::write_body(submitter, datum_hex(datum)?);
        body.asset_name = Some(hex::encode(rngfid.as_bytes()));
        let resp: TxResponse = self.post("/initiate", &body).await?;
        let policy_id = resp
            .policy_id
            .ok_or_else(|| TxError::InvalidResponse("initiate response without policyId".into()))?;
        Ok(LockedInitiate {
            tx_hash: resp.tx_hash,
            policy_id,
        })
    }

    async fn publish_oracle(
        &self,
        submitter: &Submitter,
        datum: &OracleDatum,
        unit: &AssetUnit,
    ) -> Result<TxHash, TxError> {
        let mut body = Self::write_body(submitter, datum_hex(datum)?);
        body.unit = Some(unit.to_string());
        let resp: TxResponse = self.post("/oracle/publish", &body).await?;
        Ok(resp.tx_hash)
    }

    async fn supersede_oracle(
        &self,
        submitter: &Submitter,
        prior: &OutRef,
        datum: &OracleDatum,
        unit: &AssetUnit,
    ) -> Result<TxHash, TxError> {
        let mut body = Self::write_body(submitter, datum_hex(datum)?);
        body.unit = Some(unit.to_string());
        body.prior = Some(PriorBody {
            tx_hash: prior.tx_hash.to_hex(),
            output_index: prior.index,
        });
        let resp: TxResponse = self.post("/oracle/supersede", &body).await?;
        Ok(resp.tx_hash)
    }
}
