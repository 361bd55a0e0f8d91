//! Native asset units.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// Length of a minting policy id in hex characters (28-byte script hash).
const POLICY_ID_HEX_LEN: usize = 56;

/// Ledger limit on asset name length.
const MAX_ASSET_NAME: usize = 32;

/// A native asset identified by `policy id ‖ asset name`.
///
/// The string form is what wallets and explorers call the asset "unit":
/// the hex policy id immediately followed by the hex asset name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetUnit {
    policy_id: String,
    asset_name: Vec<u8>,
}

impl AssetUnit {
    pub fn new(policy_id: &str, asset_name: &[u8]) -> Result<Self, TypeError> {
        if policy_id.len() != POLICY_ID_HEX_LEN || hex::decode(policy_id).is_err() {
            return Err(TypeError::InvalidHex { field: "policy_id" });
        }
        if asset_name.len() > MAX_ASSET_NAME {
            return Err(TypeError::FieldTooLong {
                field: "asset_name",
                len: asset_name.len(),
                max: MAX_ASSET_NAME,
            });
        }
        Ok(Self {
            policy_id: policy_id.to_ascii_lowercase(),
            asset_name: asset_name.to_vec(),
        })
    }

    /// Parse the concatenated unit form.
    pub fn parse(unit: &str) -> Result<Self, TypeError> {
        if unit.len() < POLICY_ID_HEX_LEN || !unit.is_ascii() {
            return Err(TypeError::InvalidHex { field: "unit" });
        }
        let (policy, name) = unit.split_at(POLICY_ID_HEX_LEN);
        let name = hex::decode(name).map_err(|_| TypeError::InvalidHex { field: "unit" })?;
        Self::new(policy, &name)
    }

    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    pub fn asset_name(&self) -> &[u8] {
        &self.asset_name
    }
}

impl fmt::Display for AssetUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.policy_id, hex::encode(&self.asset_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "f4c9f9c4252d86702c2f4c2e49e6648c7cffe3c8f2b6b7d779788f50";

    #[test]
    fn unit_is_policy_then_hex_name() {
        let unit = AssetUnit::new(POLICY, b"rngfid_01").unwrap();
        assert_eq!(unit.to_string(), format!("{POLICY}726e676669645f3031"));
    }

    #[test]
    fn parse_round_trips_display() {
        let unit = AssetUnit::new(POLICY, b"oracle").unwrap();
        let parsed = AssetUnit::parse(&unit.to_string()).unwrap();
        assert_eq!(parsed, unit);
        assert_eq!(parsed.asset_name(), b"oracle");
    }

    #[test]
    fn rejects_short_or_non_hex_units() {
        assert!(AssetUnit::parse("abcd").is_err());
        assert!(AssetUnit::parse(&format!("{POLICY}zz")).is_err());
        assert!(AssetUnit::new("00", b"x").is_err());
        assert!(AssetUnit::parse(&format!("{POLICY}+f+f")).is_err());
        assert!(AssetUnit::new(&"+a".repeat(28), b"x").is_err());
    }
}
