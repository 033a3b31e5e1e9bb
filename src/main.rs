//! gatehouse: dynamic first-segment reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ─────────────▶ http server ──▶ /health /register /routes /wait (control)
//!                       │
//!                       ▼ anything else
//!                 routing engine ── prefix ──▶ route table ──▶ TCP probe
//!                       │
//!            ┌──────────┴──────────┐
//!            ▼ reachable           ▼ missing / unreachable
//!     forward to backend     forward to own /wait?id=<path>
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use gatehouse::config::{resolve_config, CliArgs};
use gatehouse::lifecycle::{signals, Shutdown};
use gatehouse::observability::{logging, metrics};
use gatehouse::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config = resolve_config(&args, |key| std::env::var(key).ok())?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address(),
        probe_timeout_ms = config.routing.probe_timeout_ms,
        rewrite = ?config.routing.rewrite,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
