//! Configuration file watcher for hot reload.
//!
//! Only configurations that load and validate are forwarded; a broken edit
//! leaves the running router in place.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Watches one configuration file and publishes validated reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end the server listens on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching on notify's background thread.
    ///
    /// Updates stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_content_change(&event.kind) => {
                    tracing::info!(path = %watched.display(), "Config file changed");
                    reload(&watched, &update_tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

/// Load `path` and publish it. Returns whether a configuration was sent.
fn reload(path: &Path, tx: &mpsc::UnboundedSender<GatewayConfig>) -> bool {
    match load_config(path) {
        Ok(config) => {
            let domains = config.domains.len();
            if tx.send(config).is_err() {
                tracing::debug!("Config receiver dropped, ignoring update");
                return false;
            }
            tracing::info!(domains, "Validated configuration published");
            true
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Rejected configuration change, keeping current router"
            );
            false
        }
    }
}
