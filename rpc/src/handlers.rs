//! Route handlers: parse and validate the body, call the controller, wrap
//! the result in the success envelope.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use oracle_lifecycle::{
    ChainSyncUrl, InitiateRequest, OracleRequest, ScriptHex, Submitter, WalletSeed,
};
use oracle_types::{AssetUnit, Network, RnLen, RngFid, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::server::AppState;
use crate::RpcError;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub success: bool,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            data,
            success: true,
        })
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, RpcError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateBody {
    pub network: u8,
    pub wallet_seed: String,
    #[serde(rename = "CBORhex")]
    pub cbor_hex: String,
    #[serde(default)]
    pub rngfid: Option<String>,
    pub rnlen: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub network: u8,
    pub wallet_seed: String,
    #[serde(rename = "CBORhex")]
    pub cbor_hex: String,
    pub ogmios_url: String,
    pub rngfid: String,
    #[serde(rename = "initRNGTx")]
    pub init_rng_tx: String,
    pub rnlen: u64,
    #[serde(rename = "oracleDIDUnit")]
    pub oracle_did_unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    #[serde(flatten)]
    pub oracle: RegisterBody,
    #[serde(rename = "currUpdatedOracleDIDTx")]
    pub curr_updated_oracle_did_tx: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub network: u8,
    #[serde(rename = "currUpdatedOracleDIDTx")]
    pub curr_updated_oracle_did_tx: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateData {
    pub tx_id: String,
    pub datum: String,
    pub rngfid: String,
    pub rnlen: u8,
    pub unit: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleData {
    pub tx_hash: String,
    #[serde(rename = "oracleDIDUnit")]
    pub oracle_did_unit: String,
    pub rng_output: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    pub rng_output: String,
}

fn tx_hash(field: &str, value: &str) -> Result<TxHash, RpcError> {
    value
        .parse()
        .map_err(|_| RpcError::InvalidRequest(format!("{field} is not a transaction hash")))
}

fn submitter(network: u8, wallet_seed: &str, cbor_hex: &str) -> Result<Submitter, RpcError> {
    Ok(Submitter {
        network: Network::try_from(network)?,
        wallet: WalletSeed::new(wallet_seed)?,
        script: ScriptHex::new(cbor_hex)?,
    })
}

impl RegisterBody {
    fn into_request(self) -> Result<OracleRequest, RpcError> {
        Ok(OracleRequest {
            submitter: submitter(self.network, &self.wallet_seed, &self.cbor_hex)?,
            chain_sync: ChainSyncUrl::new(&self.ogmios_url)?,
            rngfid: RngFid::new(self.rngfid)?,
            rnlen: RnLen::new(self.rnlen)?,
            seed_tx: tx_hash("initRNGTx", &self.init_rng_tx)?,
            unit: AssetUnit::parse(&self.oracle_did_unit)?,
        })
    }
}

pub async fn initiate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InitiateBody>, JsonRejection>,
) -> ApiResult<InitiateData> {
    let Json(body) = body?;
    let req = InitiateRequest {
        submitter: submitter(body.network, &body.wallet_seed, &body.cbor_hex)?,
        rngfid: body.rngfid.map(RngFid::new).transpose()?,
        rnlen: RnLen::new(body.rnlen)?,
    };
    let receipt = state.controller.initiate(req).await?;
    Ok(Envelope::ok(InitiateData {
        tx_id: receipt.tx_hash.to_hex(),
        datum: receipt.datum,
        rngfid: receipt.rngfid.to_string(),
        rnlen: receipt.rnlen.get(),
        unit: receipt.unit.to_string(),
    }))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> ApiResult<OracleData> {
    let Json(body) = body?;
    let receipt = state.controller.register(body.into_request()?).await?;
    Ok(Envelope::ok(OracleData {
        tx_hash: receipt.tx_hash.to_hex(),
        oracle_did_unit: receipt.unit.to_string(),
        rng_output: receipt.rng_output,
    }))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> ApiResult<OracleData> {
    let Json(body) = body?;
    let prior = tx_hash("currUpdatedOracleDIDTx", &body.curr_updated_oracle_did_tx)?;
    let receipt = state
        .controller
        .update(body.oracle.into_request()?, prior)
        .await?;
    Ok(Envelope::ok(OracleData {
        tx_hash: receipt.tx_hash.to_hex(),
        oracle_did_unit: receipt.unit.to_string(),
        rng_output: receipt.rng_output,
    }))
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryBody>, JsonRejection>,
) -> ApiResult<QueryData> {
    let Json(body) = body?;
    let network = Network::try_from(body.network)?;
    let tx = tx_hash("currUpdatedOracleDIDTx", &body.curr_updated_oracle_did_tx)?;
    let rng_output = state.controller.query(network, tx).await?;
    Ok(Envelope::ok(QueryData { rng_output }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "success": true }))
}
