//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every domain can route (unique, path-safe names)
//! - Check allow-lists are usable (non-empty, defaults inside them)
//! - Validate addresses and timeouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::domain::DomainProfile;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no domains configured")]
    NoDomains,

    #[error("domain name '{0}' must be a non-empty path segment")]
    InvalidDomainName(String),

    #[error("domain '{0}' is configured more than once")]
    DuplicateDomain(String),

    #[error("domain '{domain}': {field} must not be empty")]
    EmptyAllowList { domain: String, field: &'static str },

    #[error("domain '{domain}': default {field} '{value}' is not in the allow-list")]
    DefaultNotAllowed {
        domain: String,
        field: &'static str,
        value: String,
    },

    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("listener.identity_header '{0}' is not a valid header name")]
    InvalidHeaderName(String),
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.domains.is_empty() {
        errors.push(ValidationError::NoDomains);
    }

    let mut seen = HashSet::new();
    for domain in &config.domains {
        if !seen.insert(domain.name.as_str()) {
            errors.push(ValidationError::DuplicateDomain(domain.name.clone()));
        }
        validate_domain(domain, &mut errors);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if axum::http::HeaderName::from_bytes(config.listener.identity_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName(
            config.listener.identity_header.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_domain(domain: &DomainProfile, errors: &mut Vec<ValidationError>) {
    if domain.name.is_empty() || domain.name.contains('/') {
        errors.push(ValidationError::InvalidDomainName(domain.name.clone()));
    }

    if domain.instance_types.is_empty() {
        errors.push(ValidationError::EmptyAllowList {
            domain: domain.name.clone(),
            field: "instance_types",
        });
    } else if !domain.allows_instance_type(&domain.default_instance_type) {
        errors.push(ValidationError::DefaultNotAllowed {
            domain: domain.name.clone(),
            field: "instance type",
            value: domain.default_instance_type.clone(),
        });
    }

    if domain.actions.is_empty() {
        errors.push(ValidationError::EmptyAllowList {
            domain: domain.name.clone(),
            field: "actions",
        });
    }

    if let Some(apps) = &domain.applications {
        if apps.allowed.is_empty() {
            errors.push(ValidationError::EmptyAllowList {
                domain: domain.name.clone(),
                field: "applications.allowed",
            });
        } else if !apps.allowed.contains(&apps.default) {
            errors.push(ValidationError::DefaultNotAllowed {
                domain: domain.name.clone(),
                field: "application",
                value: apps.default.clone(),
            });
        }
    }
}
