//! Price ledger mean-query server - Entry Point

use anyhow::Result;
use clap::Parser;
use mte_server::{AppConfig, Application, ConfigSource};
use tracing::{info, warn};

/// Per-session price ledger and time-range mean-query server
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "MTE_CONFIG")]
    config: Option<String>,

    /// Address to bind, overrides `server.bind`
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    mte_telemetry::init_logging(config.telemetry.log_level.as_deref())?;

    info!("Starting mte-server v{}", env!("CARGO_PKG_VERSION"));
    match source {
        ConfigSource::File(path) => info!(config_path = %path, "Configuration loaded"),
        ConfigSource::Defaults => warn!(
            path = mte_server::config::DEFAULT_CONFIG_PATH,
            "Config file not found, using defaults"
        ),
    }

    Application::new(config).run().await?;

    Ok(())
}
