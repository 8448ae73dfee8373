//! pomf download router.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client GET /f2?h=&e=&f=
//!         │
//!         ▼
//!     ┌─────────┐    ┌──────────────┐    ┌───────────────────────┐
//!     │  http   │───▶│   routing    │───▶│    load_balancer      │
//!     │ server  │    │ (origin IP,  │    │ least_load | nearest  │
//!     └────┬────┘    │  redirect)   │    └──────────┬────────────┘
//!          │         └──────────────┘               │
//!          │                                        ▼
//!          │                              ┌──────────────────┐
//!          │                              │ health probes    │───▶ storage servers
//!          │                              │ (/load, /health) │     (/load, /health)
//!          │                              └──────────────────┘
//!          ▼
//!     301 Location: {server}/get2/?h=&e=&f=
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use pomf_router::config::watcher::ConfigWatcher;
use pomf_router::http::HttpServer;
use pomf_router::lifecycle::signals::spawn_signal_listener;
use pomf_router::lifecycle::startup::resolve_config;
use pomf_router::lifecycle::Shutdown;
use pomf_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "pomf-router")]
#[command(about = "Redirects file retrievals to the best storage server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pomf-router starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = config.routing.strategy.as_str(),
        servers = config.servers.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = HttpServer::new(config.clone())?;

    // The watcher handle stops watching when dropped.
    let (_watcher, config_updates) = match args.config.as_deref() {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
