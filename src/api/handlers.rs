//! Endpoint handlers.
//!
//! # Responsibilities
//! - Validate request bodies against the domain profile
//! - Call the repository or provisioner for the domain
//! - Shape success bodies; map failures to `GatewayError`
//!
//! # Design Decisions
//! - Handlers are plain functions over borrowed state; no I/O of their own
//! - Validation order is JSON, then shape, then field allow-lists
//! - Response wording comes from the profile, never from the handler

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::clock::iso;
use crate::config::PlatformConfig;
use crate::domain::{
    ActionAck, DeployedApplication, DomainProfile, InstanceAction, InstanceRecord, LaunchSpec,
    LoadBalancer,
};
use crate::error::GatewayError;
use crate::http::response::ApiResponse;
use crate::provisioning::{InstanceProvisioner, InstanceRepository};

/// Per-request values every handler needs.
pub struct HandlerContext<'a> {
    pub headers: &'a BTreeMap<String, String>,
    pub principal_id: &'a str,
}

#[derive(Serialize)]
pub struct HealthStatus<'a> {
    pub status: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
}

#[derive(Serialize)]
pub struct InstanceList {
    pub instances: Vec<InstanceRecord>,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApplicationList<'a> {
    pub applications: &'a [DeployedApplication],
    pub total_applications: usize,
    pub load_balancer: &'a LoadBalancer,
}

pub fn health(
    ctx: &HandlerContext<'_>,
    now: DateTime<Utc>,
    platform: Option<&PlatformConfig>,
) -> ApiResponse {
    let body = HealthStatus {
        status: "healthy",
        timestamp: iso(now),
        platform: platform.map(|p| p.name.as_str()),
        version: platform.map(|p| p.version.as_str()),
    };
    ApiResponse::json(StatusCode::OK, &body, ctx.headers)
}

pub fn list_instances(
    ctx: &HandlerContext<'_>,
    profile: &DomainProfile,
    repository: &dyn InstanceRepository,
) -> Result<ApiResponse, GatewayError> {
    let instances = repository.list_instances(&profile.name, ctx.principal_id)?;

    let body = InstanceList {
        instances,
        message: profile.list_message(),
    };
    Ok(ApiResponse::json(StatusCode::OK, &body, ctx.headers))
}

pub fn create_instance(
    ctx: &HandlerContext<'_>,
    profile: &DomainProfile,
    raw_body: &str,
    provisioner: &dyn InstanceProvisioner,
) -> Result<ApiResponse, GatewayError> {
    let failure = profile.create_failure();

    let body = parse_body(raw_body)?;
    let fields = body
        .as_object()
        .ok_or_else(|| GatewayError::operation(failure.clone()))?;

    let instance_type = string_field(fields, "instance_type", &profile.default_instance_type)
        .filter(|t| profile.allows_instance_type(t))
        .ok_or(GatewayError::InvalidInstanceType)?;

    let application = match &profile.applications {
        Some(policy) => Some(
            string_field(fields, "application", &policy.default)
                .filter(|a| policy.allowed.contains(a))
                .ok_or(GatewayError::InvalidApplication)?,
        ),
        None => None,
    };

    let spec = LaunchSpec {
        domain: profile.name.clone(),
        instance_type,
        application,
        ready_delay_secs: profile.ready_delay_secs,
    };

    let launched = provisioner
        .launch(&spec, ctx.principal_id)
        .map_err(|e| GatewayError::Operation {
            message: failure,
            source: Some(e),
        })?;

    Ok(ApiResponse::json(StatusCode::CREATED, &launched, ctx.headers))
}

pub fn manage_instance(
    ctx: &HandlerContext<'_>,
    profile: &DomainProfile,
    instance_id: &str,
    raw_body: &str,
    provisioner: &dyn InstanceProvisioner,
) -> Result<ApiResponse, GatewayError> {
    let failure = profile.manage_failure();

    let body = parse_body(raw_body)?;
    let fields = body
        .as_object()
        .ok_or_else(|| GatewayError::operation(failure.clone()))?;

    let action = fields
        .get("action")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<InstanceAction>().ok())
        .filter(|a| profile.allows_action(*a))
        .ok_or(GatewayError::InvalidAction)?;

    // No ownership check: the caller is trusted to own `instance_id`.
    let status = provisioner
        .submit_action(instance_id, action, ctx.principal_id)
        .map_err(|e| GatewayError::Operation {
            message: failure,
            source: Some(e),
        })?;

    let ack = ActionAck {
        instance_id: instance_id.to_string(),
        action,
        status,
        user_id: ctx.principal_id.to_string(),
        message: profile.action_message(action),
    };
    Ok(ApiResponse::json(StatusCode::OK, &ack, ctx.headers))
}

pub fn list_applications(
    ctx: &HandlerContext<'_>,
    profile: &DomainProfile,
) -> Result<ApiResponse, GatewayError> {
    let catalog = profile.catalog.as_ref().ok_or(GatewayError::NotFound)?;

    let body = ApplicationList {
        applications: &catalog.applications,
        total_applications: catalog.applications.len(),
        load_balancer: &catalog.load_balancer,
    };
    Ok(ApiResponse::json(StatusCode::OK, &body, ctx.headers))
}

fn parse_body(raw: &str) -> Result<Value, GatewayError> {
    serde_json::from_str(raw).map_err(|_| GatewayError::InvalidJson)
}

/// Absent → `default`; a string → itself; anything else (null included) → `None`.
fn string_field(fields: &Map<String, Value>, name: &str, default: &str) -> Option<String> {
    match fields.get(name) {
        None => Some(default.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => None,
    }
}
