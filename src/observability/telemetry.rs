//! Per-request observability handle.

use axum::http::StatusCode;
use std::error::Error as _;
use std::time::Instant;

use crate::error::GatewayError;
use crate::http::event::ApiEvent;
use crate::observability::metrics;

/// Logging and metrics sink injected into the router.
#[derive(Debug, Clone)]
pub struct Telemetry {
    service: String,
    metrics_enabled: bool,
}

impl Telemetry {
    pub fn new(service: impl Into<String>, metrics_enabled: bool) -> Self {
        Self {
            service: service.into(),
            metrics_enabled,
        }
    }

    /// Logs only; no metrics recorded.
    pub fn logs_only(service: impl Into<String>) -> Self {
        Self::new(service, false)
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Span covering the handling of one event.
    pub fn request_span(&self, event: &ApiEvent) -> tracing::Span {
        tracing::info_span!(
            "request",
            service = %self.service,
            method = %event.method(),
            path = %event.path(),
            principal = %event.principal_id(),
        )
    }

    pub fn request_received(&self, event: &ApiEvent) {
        tracing::info!("Handling request");
        tracing::debug!(event = ?event, "Raw event");
    }

    pub fn request_completed(&self, route: &str, status: StatusCode, started: Instant) {
        tracing::info!(
            route,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
        if self.metrics_enabled {
            metrics::record_request(route, status.as_u16(), started);
        }
    }

    pub fn request_failed(&self, route: &str, err: &GatewayError) {
        let cause = match err {
            GatewayError::Internal(detail) => Some(detail.clone()),
            other => other.source().map(ToString::to_string),
        };
        if err.status().is_server_error() {
            tracing::error!(route, error = %err, cause = ?cause, "Request failed");
        } else {
            tracing::warn!(route, error = %err, "Request rejected");
        }
    }
}
