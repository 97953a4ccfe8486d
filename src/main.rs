//! Demo service with traffic telemetry.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request  ──▶ traffic middleware ──▶ handlers (/ping, /echo, /fail)
//!                              │      ▲                  │
//!                              │      └── capture body ◀─┘
//!                              ▼
//!                         UbtClient ──(background task)──▶ POST {server_url}/logging/v2
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use ubt_telemetry::config::{load_config, UbtConfig};
use ubt_telemetry::observability::{logging, metrics};
use ubt_telemetry::{HttpServer, UbtClient};

#[derive(Parser)]
#[command(name = "ubt-telemetry")]
#[command(about = "Demo service that reports its traffic to a telemetry collector", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => UbtConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("ubt-telemetry v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        collector = %config.client.endpoint(),
        app_name = %config.client.app_name,
        mode = ?config.client.mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = UbtClient::new(config.client.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config, client);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
