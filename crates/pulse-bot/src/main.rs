//! WhalePulse market monitor - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

/// WhalePulse market monitor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via WHALEPULSE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    pulse_ws::init_crypto();

    let args = Args::parse();

    // Determine config path: CLI arg > WHALEPULSE_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("WHALEPULSE_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = pulse_bot::AppConfig::load(&config_path)?;

    pulse_telemetry::init_logging(&config.telemetry.log_filter)?;

    info!("Starting WhalePulse v{}", env!("CARGO_PKG_VERSION"));
    if !std::path::Path::new(&config_path).exists() {
        warn!(config_path = %config_path, "Config file not found, using defaults");
    }
    info!(config_path = %config_path, symbols = config.symbols.len(), "Configuration loaded");

    let mut app = pulse_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
