//! Daemon configuration with TOML file support.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. CLI flags are applied on top in `main`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use oracle_types::Network;
use oracle_utils::LogFormat;
use oracle_vrf::DEFAULT_STEP_BUDGET;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    #[serde(default)]
    pub log_format: LogFormat,

    /// `EnvFilter` directive, e.g. `"info"` or `"info,oracle_vrf=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub explorer: ExplorerConfig,

    #[serde(default)]
    pub chain_sync: ChainSyncConfig,

    #[serde(default)]
    pub tx_service: TxServiceConfig,
}

/// Blockfrost-compatible explorer, one endpoint per network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_preprod_url")]
    pub preprod_url: String,
    #[serde(default = "default_mainnet_url")]
    pub mainnet_url: String,
    #[serde(default)]
    pub preprod_project_id: String,
    #[serde(default)]
    pub mainnet_project_id: String,
    #[serde(default = "default_explorer_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSyncConfig {
    /// `nextBlock` requests allowed after the intersection.
    #[serde(default = "default_step_budget")]
    pub step_budget: u64,
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

/// External transaction-building service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxServiceConfig {
    #[serde(default = "default_tx_service_url")]
    pub url: String,
    #[serde(default = "default_tx_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7000))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_preprod_url() -> String {
    Network::Preprod.default_explorer_url().to_string()
}

fn default_mainnet_url() -> String {
    Network::Mainnet.default_explorer_url().to_string()
}

fn default_explorer_timeout_secs() -> u64 {
    10
}

fn default_step_budget() -> u64 {
    DEFAULT_STEP_BUDGET
}

fn default_lookup_timeout_secs() -> u64 {
    30
}

fn default_tx_service_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_tx_timeout_secs() -> u64 {
    120
}

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl ExplorerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ChainSyncConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

impl TxServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            explorer: ExplorerConfig::default(),
            chain_sync: ChainSyncConfig::default(),
            tx_service: TxServiceConfig::default(),
        }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            preprod_url: default_preprod_url(),
            mainnet_url: default_mainnet_url(),
            preprod_project_id: String::new(),
            mainnet_project_id: String::new(),
            timeout_secs: default_explorer_timeout_secs(),
        }
    }
}

impl Default for ChainSyncConfig {
    fn default() -> Self {
        Self {
            step_budget: default_step_budget(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

impl Default for TxServiceConfig {
    fn default() -> Self {
        Self {
            url: default_tx_service_url(),
            timeout_secs: default_tx_timeout_secs(),
        }
    }
}
