//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! RequestRouter (holds a Telemetry handle)
//!     → telemetry.rs (per-request span and outcome events)
//!     → logging.rs (subscriber: env filter + fmt layer)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log stream
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The router never touches global logger state; it receives a handle
//! - Subscriber is installed once, by the binary
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
pub mod telemetry;

pub use telemetry::Telemetry;
