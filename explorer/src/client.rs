//! Blockfrost REST client.

use std::time::Duration;

use async_trait::async_trait;
use oracle_types::{Network, OutRef, TxHash};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::{BlockInfo, ExplorerError, LedgerExplorer, UtxoInfo};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Base URL and API key for one network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerEndpoint {
    pub base_url: String,
    pub project_id: String,
}

impl ExplorerEndpoint {
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
        }
    }

    /// The public Blockfrost URL for `network`.
    pub fn public(network: Network, project_id: impl Into<String>) -> Self {
        Self::new(network.default_explorer_url(), project_id)
    }
}

/// Client for a Blockfrost-compatible explorer, one endpoint per network.
pub struct BlockfrostClient {
    http_client: reqwest::Client,
    preprod: ExplorerEndpoint,
    mainnet: ExplorerEndpoint,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    block_height: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    hash: String,
    #[serde(default)]
    slot: Option<u64>,
    #[serde(default)]
    height: Option<u64>,
    #[serde(default)]
    previous_block: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TxUtxosResponse {
    outputs: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    output_index: u32,
    #[serde(default)]
    inline_datum: Option<String>,
    #[serde(default)]
    consumed_by_tx: Option<String>,
}

impl BlockfrostClient {
    pub fn new(preprod: ExplorerEndpoint, mainnet: ExplorerEndpoint) -> Self {
        Self::with_timeout(preprod, mainnet, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        preprod: ExplorerEndpoint,
        mainnet: ExplorerEndpoint,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            preprod,
            mainnet,
        }
    }

    fn endpoint(&self, network: Network) -> &ExplorerEndpoint {
        match network {
            Network::Preprod => &self.preprod,
            Network::Mainnet => &self.mainnet,
        }
    }

    /// `GET {base}{path}`. 404 maps to [`ExplorerError::NotFound`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        network: Network,
        path: &str,
    ) -> Result<T, ExplorerError> {
        let endpoint = self.endpoint(network);
        let url = format!("{}{}", endpoint.base_url.trim_end_matches('/'), path);
        debug!(%network, %url, "explorer request");

        let response = self
            .http_client
            .get(&url)
            .header("project_id", &endpoint.project_id)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExplorerError::Unavailable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ExplorerError::Unavailable(format!("connection failed: {e}"))
                } else {
                    ExplorerError::Unavailable(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ExplorerError::NotFound(path.to_string())),
            status if !status.is_success() => {
                return Err(ExplorerError::Unavailable(format!(
                    "HTTP status {status} for {path}"
                )))
            }
            _ => {}
        }

        response.json().await.map_err(|e| {
            ExplorerError::InvalidResponse(format!("failed to parse {path}: {e}"))
        })
    }

    async fn block(&self, network: Network, id: &str) -> Result<BlockInfo, ExplorerError> {
        let path = format!("/blocks/{id}");
        let raw: BlockResponse = self.get_json(network, &path).await?;
        let slot = raw
            .slot
            .ok_or_else(|| ExplorerError::NotFound(format!("slot of block {id}")))?;
        Ok(BlockInfo {
            hash: raw.hash,
            slot,
            height: raw.height,
            previous_block: raw.previous_block,
        })
    }
}

#[async_trait]
impl LedgerExplorer for BlockfrostClient {
    async fn tx_block_height(&self, network: Network, tx: &TxHash) -> Result<u64, ExplorerError> {
        let raw: TxResponse = self.get_json(network, &format!("/txs/{tx}")).await?;
        raw.block_height
            .ok_or_else(|| ExplorerError::NotFound(format!("block height of tx {tx}")))
    }

    async fn block_by_height(
        &self,
        network: Network,
        height: u64,
    ) -> Result<BlockInfo, ExplorerError> {
        self.block(network, &height.to_string()).await
    }

    async fn block_by_hash(&self, network: Network, hash: &str) -> Result<BlockInfo, ExplorerError> {
        self.block(network, hash).await
    }

    async fn utxo_at(&self, network: Network, out_ref: &OutRef) -> Result<UtxoInfo, ExplorerError> {
        let path = format!("/txs/{}/utxos", out_ref.tx_hash);
        let raw: TxUtxosResponse = self.get_json(network, &path).await?;
        let output = raw
            .outputs
            .into_iter()
            .find(|o| o.output_index == out_ref.index)
            .ok_or_else(|| ExplorerError::NotFound(format!("output {out_ref}")))?;

        let inline_datum = output
            .inline_datum
            .map(|h| {
                hex::decode(&h).map_err(|_| {
                    ExplorerError::InvalidResponse(format!("inline datum of {out_ref} is not hex"))
                })
            })
            .transpose()?;

        Ok(UtxoInfo {
            out_ref: *out_ref,
            inline_datum,
            spent: output.consumed_by_tx.is_some(),
        })
    }
}
