//! Collection Gate
//!
//! Serves `/api/collections/{collection}/records` with two request filters
//! layered on top:
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ collection rate limiter ─▶ router
//!                                             (429 when exhausted)          │
//!                                                                           ▼
//!     Client Response                                               record handlers
//!     ◀───────────── JSON envelope ◀─ post-list hooks (?excluded=) ◀────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use collection_gate::config::{load_config, GateConfig};
use collection_gate::lifecycle::{wait_for_signal, Shutdown};
use collection_gate::observability::{logging, metrics};
use collection_gate::GateServer;

#[derive(Parser)]
#[command(name = "collection-gate", version)]
#[command(about = "Per-collection rate limiting and field exclusion for a records API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("collection-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?cli.config,
        bind_address = %config.listener.bind_address,
        policies = config.rate_limit.policies.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.trigger();
        }
    });

    GateServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
