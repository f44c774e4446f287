//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract routing-relevant information (method, path, body)
//! - Resolve the caller identity from the trusted identity header
//! - Build the event envelope handed to the router
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Empty body maps to an absent body, as a gateway would deliver it
//! - Body size limits enforced before the router runs

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::event::ApiEvent;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID v4 per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID assigned by the request-id layer, if any.
pub fn request_id<B>(request: &Request<B>) -> Option<&str> {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}

/// Body exceeded the configured limit or could not be read.
#[derive(Debug, thiserror::Error)]
#[error("request body could not be read within {limit} bytes")]
pub struct BodyReadError {
    pub limit: usize,
}

/// Convert an HTTP request into the event envelope the router consumes.
pub async fn into_event(
    request: Request<Body>,
    identity_header: &HeaderName,
    body_limit: usize,
) -> Result<ApiEvent, BodyReadError> {
    let (parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, body_limit)
        .await
        .map_err(|_| BodyReadError { limit: body_limit })?;

    let mut event = ApiEvent::new(parts.method.as_str(), parts.uri.path());
    if !bytes.is_empty() {
        event = event.with_body(String::from_utf8_lossy(&bytes).into_owned());
    }

    let principal = parts
        .headers
        .get(identity_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(principal) = principal {
        event = event.with_principal(principal);
    }

    Ok(event)
}
