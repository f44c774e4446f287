//! Outbound response envelope.
//!
//! # Responsibilities
//! - Carry status, JSON body string and the fixed header set
//! - Render error bodies as `{"error": "..."}`
//! - Convert into an axum response for the HTTP surface
//!
//! # Design Decisions
//! - Body is kept as a pre-serialized string, as a gateway expects it
//! - Headers live in a BTreeMap so serialized envelopes are stable
//! - Header names or values that are not valid HTTP are dropped with a warning

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body used when serialization itself fails.
const FALLBACK_ERROR_BODY: &str = r#"{"error": "Internal server error"}"#;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    /// Serialize `body` as JSON.
    pub fn json<T: Serialize>(
        status: StatusCode,
        body: &T,
        headers: &BTreeMap<String, String>,
    ) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self {
                status_code: status.as_u16(),
                body,
                headers: headers.clone(),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self::internal_error(headers)
            }
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: StatusCode, message: &str, headers: &BTreeMap<String, String>) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }), headers)
    }

    /// Generic 500 that cannot fail to build.
    pub fn internal_error(headers: &BTreeMap<String, String>) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            body: FALLBACK_ERROR_BODY.to_string(),
            headers: headers.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Parse the body back into JSON.
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = StatusCode::from_u16(self.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }
        response
    }
}
