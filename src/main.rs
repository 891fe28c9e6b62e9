//! Bento edge worker.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request     ┌──────────────────────────────────────────────┐
//!     ───────────────────┼─▶ http server ─▶ edge router ─┬─ /health ──┐ │
//!                        │                                │            │ │
//!                        │                                ▼            │ │
//!                        │                    container namespace      │ │
//!                        │                     (id → handle, fetch) ───┼─┼──▶ Bento container
//!     Client Response    │                                │            │ │
//!     ◀──────────────────┼── + X-Processed-By ◀───────────┘◀───────────┘ │
//!                        │   + X-Container-Id                            │
//!                        └──────────────────────────────────────────────┘
//! ```

use bento_worker::config::{load_config, watcher::ConfigWatcher, WorkerConfig};
use bento_worker::lifecycle::{signals, Shutdown};
use bento_worker::observability::{logging, metrics};
use bento_worker::HttpServer;
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "bento-worker")]
#[command(about = "Edge worker forwarding requests to a Bento container", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watch the configuration file and apply changes without restarting.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => WorkerConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("bento-worker v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        container_host = %config.container.host,
        container_port = config.container.port,
        instance = %config.container.instance_name,
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

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
