//! Network selector.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// Which Cardano network an operation targets.
///
/// On the wire (HTTP request bodies) the network is a small integer:
/// `0` for preprod and `1` for mainnet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Network {
    /// The public pre-production test network.
    Preprod,
    /// The production network.
    Mainnet,
}

impl Network {
    /// Default explorer base URL for this network.
    pub fn default_explorer_url(&self) -> &'static str {
        match self {
            Self::Preprod => "https://cardano-preprod.blockfrost.io/api/v0",
            Self::Mainnet => "https://cardano-mainnet.blockfrost.io/api/v0",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preprod => "preprod",
            Self::Mainnet => "mainnet",
        }
    }
}

impl TryFrom<u8> for Network {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Preprod),
            1 => Ok(Self::Mainnet),
            other => Err(TypeError::UnknownNetwork(other)),
        }
    }
}

impl From<Network> for u8 {
    fn from(network: Network) -> Self {
        match network {
            Network::Preprod => 0,
            Network::Mainnet => 1,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_map_to_networks() {
        assert_eq!(Network::try_from(0).unwrap(), Network::Preprod);
        assert_eq!(Network::try_from(1).unwrap(), Network::Mainnet);
        assert_eq!(Network::try_from(2), Err(TypeError::UnknownNetwork(2)));
    }

    #[test]
    fn serde_uses_integer_form() {
        let net: Network = serde_json::from_str("1").unwrap();
        assert_eq!(net, Network::Mainnet);
        assert_eq!(serde_json::to_string(&Network::Preprod).unwrap(), "0");
        assert!(serde_json::from_str::<Network>("7").is_err());
    }
}
