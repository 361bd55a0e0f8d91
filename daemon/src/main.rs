//! Oracle daemon: loads configuration, wires the collaborators and serves
//! the HTTP API until SIGINT/SIGTERM.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use oracle_explorer::{BlockfrostClient, ExplorerEndpoint};
use oracle_lifecycle::{HttpTxBuilder, OracleController};
use oracle_rpc::RpcServer;
use oracle_utils::{init_logging, LogFormat, ShutdownController};
use oracle_vrf::{VrfLocator, WsConnector};
use tracing::{info, warn};

use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "oracle-daemon", about = "VRF-seeded random-number oracle")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "ORACLE_CONFIG")]
    config: Option<PathBuf>,

    /// Address for the HTTP API.
    #[arg(long, env = "ORACLE_LISTEN")]
    listen: Option<SocketAddr>,

    /// Log filter: "trace", "debug", "info", "warn", "error" or a full
    /// `EnvFilter` directive.
    #[arg(long, env = "ORACLE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, env = "ORACLE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Explorer project id for preprod.
    #[arg(long, env = "ORACLE_PREPROD_PROJECT_ID", hide_env_values = true)]
    preprod_project_id: Option<String>,

    /// Explorer project id for mainnet.
    #[arg(long, env = "ORACLE_MAINNET_PROJECT_ID", hide_env_values = true)]
    mainnet_project_id: Option<String>,

    /// Base URL of the transaction service.
    #[arg(long, env = "ORACLE_TX_SERVICE_URL")]
    tx_service_url: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut DaemonConfig) {
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(id) = self.preprod_project_id {
            config.explorer.preprod_project_id = id;
        }
        if let Some(id) = self.mainnet_project_id {
            config.explorer.mainnet_project_id = id;
        }
        if let Some(url) = self.tx_service_url {
            config.tx_service.url = url;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    let config_path = cli.config.clone();
    cli.apply(&mut config);

    init_logging(config.log_format, &config.log_level);
    match &config_path {
        Some(path) => info!("loaded config from {}", path.display()),
        None => info!("no config file given, using defaults"),
    }
    if config.explorer.preprod_project_id.is_empty() {
        warn!("no preprod explorer project id configured");
    }
    if config.explorer.mainnet_project_id.is_empty() {
        warn!("no mainnet explorer project id configured");
    }

    let explorer = Arc::new(BlockfrostClient::with_timeout(
        ExplorerEndpoint::new(&config.explorer.preprod_url, &config.explorer.preprod_project_id),
        ExplorerEndpoint::new(&config.explorer.mainnet_url, &config.explorer.mainnet_project_id),
        config.explorer.timeout(),
    ));
    let locator = VrfLocator::new(Arc::new(WsConnector), config.chain_sync.step_budget);
    let tx_builder = Arc::new(HttpTxBuilder::with_timeout(
        &config.tx_service.url,
        config.tx_service.timeout(),
    ));
    let controller = OracleController::new(explorer, locator, tx_builder)
        .with_lookup_timeout(config.chain_sync.lookup_timeout());

    info!(
        listen = %config.listen_addr,
        step_budget = config.chain_sync.step_budget,
        tx_service = %config.tx_service.url,
        "starting oracle daemon"
    );

    let shutdown = Arc::new(ShutdownController::new());
    let stopped = shutdown.stopped();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    RpcServer::new(config.listen_addr, controller)
        .run(stopped)
        .await
        .context("HTTP API server failed")?;

    info!("oracle daemon stopped");
    Ok(())
}
