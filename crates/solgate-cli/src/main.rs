//! Command-line interface for the solgate telemetry gateway.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use solgate_core::{GatewayConfig, StateStore};
use solgate_devices::Gateway;
use solgate_storage::{MemoryStateStore, RedbStateStore};

/// Solgate - solar telemetry gateway.
#[derive(Parser, Debug)]
#[command(name = "solgate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "solgate.toml")]
    config: PathBuf,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the device continuously.
    Run,
    /// Probe the device once and print its system information.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args.config)?;

    match args.command {
        Command::Run => run(config).await,
        Command::Check => check(config).await,
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "solgate=debug" } else { "solgate=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let json_logging = std::env::var("SOLGATE_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    }
}

fn load_config(path: &PathBuf) -> Result<GatewayConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration from {}", path.display()))?;
    let config: GatewayConfig =
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn open_store(config: &GatewayConfig) -> Result<Arc<dyn StateStore>> {
    match &config.db_path {
        Some(path) => {
            info!(path, "opening state database");
            let store = RedbStateStore::open(path)
                .with_context(|| format!("opening state database at {}", path))?;
            Ok(Arc::new(store))
        }
        None => {
            info!("no db_path configured, state is in-memory only");
            Ok(Arc::new(MemoryStateStore::new()))
        }
    }
}

async fn run(config: GatewayConfig) -> Result<()> {
    let store = open_store(&config)?;
    let gateway = Arc::new(Gateway::new(config, store)?);

    gateway.start().await?;
    info!("gateway started, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("listening for shutdown signal")?;
    gateway.stop().await;
    info!("gateway stopped");
    Ok(())
}

async fn check(config: GatewayConfig) -> Result<()> {
    let host = config.host.clone();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let gateway = Gateway::new(config, store)?;

    let info = gateway
        .probe()
        .await
        .with_context(|| format!("device at {} did not answer", host))?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
