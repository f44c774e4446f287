//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainProfile;

/// Root configuration for the gateway.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Built-in variant to fill `domains` and `platform` from when they are absent.
    /// A file without it and without domains gets the web variant.
    #[serde(default)]
    pub preset: Option<Variant>,

    /// Listener configuration (bind address, body limit, identity header).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Fixed CORS headers attached to every response.
    pub cors: CorsConfig,

    /// Platform identity reported on `/health` and in a response header.
    #[serde(default)]
    pub platform: Option<PlatformConfig>,

    /// Domains served, in routing order.
    #[serde(default)]
    pub domains: Vec<DomainProfile>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Web)
    }
}

impl GatewayConfig {
    /// Configuration equivalent to one of the historical deployments.
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            preset: Some(variant),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            cors: CorsConfig::default(),
            platform: variant.platform(),
            domains: variant.domains(),
        }
    }

    /// Fill `domains` and `platform` from the preset where the file left them out.
    pub fn apply_preset(&mut self) {
        if self.preset.is_none() && self.domains.is_empty() {
            self.preset = Some(Variant::Web);
        }
        if let Some(variant) = self.preset {
            if self.domains.is_empty() {
                self.domains = variant.domains();
            }
            if self.platform.is_none() {
                self.platform = variant.platform();
            }
        }
    }

    /// Headers every response carries, in a stable order.
    pub fn response_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            self.cors.allow_origin.clone(),
        );
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            self.cors.allow_methods.clone(),
        );
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            self.cors.allow_headers.clone(),
        );
        if let Some(platform) = &self.platform {
            if let Some(value) = &platform.header_value {
                headers.insert(platform.header_name.clone(), value.clone());
            }
        }
        headers
    }
}

/// Historical deployment variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Gaming,
    Web,
}

impl Variant {
    pub fn domains(self) -> Vec<DomainProfile> {
        match self {
            Variant::Gaming => vec![DomainProfile::gaming()],
            Variant::Web => vec![DomainProfile::web()],
        }
    }

    pub fn platform(self) -> Option<PlatformConfig> {
        match self {
            Variant::Gaming => None,
            Variant::Web => Some(PlatformConfig {
                name: "EC2 Deployment Automation".to_string(),
                version: "1.0.0".to_string(),
                header_name: default_platform_header(),
                header_value: Some("EC2-Deployment-Automation".to_string()),
            }),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Gaming => f.write_str("gaming"),
            Variant::Web => f.write_str("web"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaming" => Ok(Variant::Gaming),
            "web" => Ok(Variant::Web),
            other => Err(format!("unknown variant '{other}' (expected gaming or web)")),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest accepted request body in bytes.
    pub max_body_size: usize,

    /// Trusted header carrying the caller identity set by the fronting authorizer.
    pub identity_header: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 1024 * 1024,
            identity_header: "x-principal-id".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// CORS headers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET,POST,PUT,DELETE".to_string(),
            allow_headers: "Content-Type,Authorization".to_string(),
        }
    }
}

/// Platform identity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlatformConfig {
    pub name: String,
    pub version: String,

    /// Response header naming the platform.
    #[serde(default = "default_platform_header")]
    pub header_name: String,

    /// Value of `header_name`; the header is omitted when unset.
    #[serde(default)]
    pub header_value: Option<String>,
}

fn default_platform_header() -> String {
    "X-Platform".to_string()
}
