//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use instance_gateway::api::RequestRouter;
use instance_gateway::clock::FixedClock;
use instance_gateway::config::GatewayConfig;
use instance_gateway::http::{HttpServer, RouterFactory};
use instance_gateway::lifecycle::Shutdown;
use instance_gateway::observability::Telemetry;

/// Fixed instant used wherever a test needs deterministic timestamps.
pub const NOW: &str = "2024-09-26T12:00:00";

/// Router with a fixed clock and no metrics.
pub fn router(config: &GatewayConfig) -> RequestRouter {
    fixed_factory()(config)
}

pub fn fixed_factory() -> RouterFactory {
    Arc::new(|config: &GatewayConfig| {
        RequestRouter::builder(config)
            .clock(Arc::new(FixedClock::parse(NOW).expect("valid test timestamp")))
            .telemetry(Telemetry::logs_only("test"))
            .build()
    })
}

/// Path of a shipped sample profile.
pub fn profile_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("profiles")
        .join(format!("{name}.toml"))
}

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<GatewayConfig>,
    handle: JoinHandle<()>,
}

impl TestGateway {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Signal shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Start a gateway for `config` on 127.0.0.1 with an OS-assigned port.
pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    let (config_tx, config_rx) = mpsc::unbounded_channel();

    let server = HttpServer::with_factory(config, fixed_factory());
    let handle = tokio::spawn(async move {
        server.run(listener, config_rx, shutdown_rx).await.unwrap();
    });

    TestGateway {
        addr,
        shutdown,
        config_tx,
        handle,
    }
}
