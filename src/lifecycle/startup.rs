//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics exporter when enabled
//! - Start the config watcher when serving from a file
//! - Bind the listener and serve until a termination signal
//!
//! # Design Decisions
//! - Metrics failures are logged, not fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::observability::metrics;

/// Serve `config` until SIGINT/SIGTERM. `config_path` enables hot reload.
pub async fn serve(
    config: GatewayConfig,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher stops when dropped, so it lives until serve returns.
    let (_watcher, config_updates) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        domains = ?config.domains.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let signals = spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    signals.abort();
    tracing::info!("Shutdown complete");
    Ok(())
}
