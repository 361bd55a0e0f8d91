//! Chain-sync JSON-RPC frames.
//!
//! Requests carry a correlation id. The intersection request always uses the
//! fixed id [`FIND_INTERSECTION_ID`]; `nextBlock` requests carry a decreasing
//! integer which doubles as the remaining step budget.

use oracle_types::ChainPoint;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::VrfError;

pub const FIND_INTERSECTION_ID: &str = "find-intersection";

const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: Value,
}

/// `findIntersection` over the given candidate points.
pub fn find_intersection(points: &[ChainPoint]) -> String {
    let points: Vec<Value> = points
        .iter()
        .map(|p| json!({ "id": p.hash, "slot": p.slot }))
        .collect();
    encode(Request {
        jsonrpc: JSONRPC_VERSION,
        method: "findIntersection",
        params: json!({ "points": points }),
        id: Value::from(FIND_INTERSECTION_ID),
    })
}

/// `nextBlock` tagged with the remaining step budget.
pub fn next_block(id: u64) -> String {
    encode(Request {
        jsonrpc: JSONRPC_VERSION,
        method: "nextBlock",
        params: json!({}),
        id: Value::from(id),
    })
}

fn encode(request: Request<'_>) -> String {
    // A struct of strings and JSON values always serialises.
    serde_json::to_string(&request).unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LeaderValue {
    pub output: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    #[serde(default)]
    pub leader_value: Option<LeaderValue>,
}

/// The parts of a block the oracle cares about.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BlockHeader {
    pub id: String,
    pub slot: u64,
    #[serde(default)]
    pub height: Option<u64>,
    /// Absent on Byron-era blocks, which carry no VRF.
    #[serde(default)]
    pub issuer: Option<Issuer>,
}

impl BlockHeader {
    pub fn vrf_output(&self) -> Option<&str> {
        self.issuer
            .as_ref()
            .and_then(|i| i.leader_value.as_ref())
            .map(|lv| lv.output.as_str())
    }

    pub fn point(&self) -> ChainPoint {
        ChainPoint::new(self.slot, self.id.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Tip {
    pub slot: u64,
    pub id: String,
    #[serde(default)]
    pub height: Option<u64>,
}

/// One roll-forward or roll-backward step.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BlockEnvelope {
    pub direction: Direction,
    #[serde(default)]
    pub block: Option<BlockHeader>,
    #[serde(default)]
    pub tip: Option<Tip>,
}

impl BlockEnvelope {
    /// The block if this step rolled forward onto `target`.
    pub fn forward_onto(&self, target: &ChainPoint) -> Option<&BlockHeader> {
        match (&self.direction, &self.block) {
            (Direction::Forward, Some(block)) if target.is(block.slot, &block.id) => Some(block),
            _ => None,
        }
    }
}

/// A decoded response, classified by its correlation id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Answer to `findIntersection`; `found` is false when the endpoint
    /// reported no intersection.
    Intersection { found: bool },
    /// Answer to the `nextBlock` request tagged `id`.
    NextBlock { id: u64, envelope: BlockEnvelope },
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

/// Parse one text frame from the endpoint.
pub fn parse_reply(text: &str) -> Result<Reply, VrfError> {
    let raw: RawResponse = serde_json::from_str(text)
        .map_err(|e| VrfError::Protocol(format!("malformed frame: {e}")))?;

    match raw.id {
        Some(Value::String(ref id)) if id == FIND_INTERSECTION_ID => {
            if raw.error.is_some() {
                return Ok(Reply::Intersection { found: false });
            }
            let found = raw
                .result
                .as_ref()
                .and_then(|r| r.get("intersection"))
                .is_some_and(|i| !i.is_null());
            Ok(Reply::Intersection { found })
        }
        Some(Value::Number(ref n)) => {
            let id = n
                .as_u64()
                .ok_or_else(|| VrfError::Protocol(format!("invalid nextBlock id {n}")))?;
            if let Some(err) = raw.error {
                return Err(VrfError::Protocol(format!(
                    "nextBlock failed (code {}): {}",
                    err.code.unwrap_or_default(),
                    err.message
                )));
            }
            let result = raw
                .result
                .ok_or_else(|| VrfError::Protocol("nextBlock response without result".into()))?;
            let envelope: BlockEnvelope = serde_json::from_value(result)
                .map_err(|e| VrfError::Protocol(format!("malformed nextBlock result: {e}")))?;
            Ok(Reply::NextBlock { id, envelope })
        }
        Some(other) => Err(VrfError::Protocol(format!("unknown correlation id {other}"))),
        None => Err(VrfError::Protocol("response without correlation id".into())),
    }
}
