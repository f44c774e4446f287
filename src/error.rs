//! Request-level error taxonomy.
//!
//! Every failure inside the router ends up as one of these variants and is
//! rendered into a response envelope; nothing propagates past the router.

use axum::http::StatusCode;
use thiserror::Error;

use crate::provisioning::{ProvisionError, RepositoryError};

/// Errors that can occur while handling a single request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request body is not valid JSON.
    #[error("Invalid JSON in request body")]
    InvalidJson,

    /// `instance_type` outside the profile allow-list.
    #[error("Invalid instance type")]
    InvalidInstanceType,

    /// `application` outside the profile allow-list.
    #[error("Invalid application type")]
    InvalidApplication,

    /// `action` outside the profile's allowed actions.
    #[error("Invalid action")]
    InvalidAction,

    /// No route matched the method and path.
    #[error("Endpoint not found")]
    NotFound,

    /// Instance datastore failed.
    #[error("Database error")]
    Repository(#[source] RepositoryError),

    /// A handler failed after validation; the message is user-facing.
    #[error("{message}")]
    Operation {
        message: String,
        #[source]
        source: Option<ProvisionError>,
    },

    /// Anything else.
    #[error("Internal server error")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidJson
            | GatewayError::InvalidInstanceType
            | GatewayError::InvalidApplication
            | GatewayError::InvalidAction => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Repository(_)
            | GatewayError::Operation { .. }
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build an operation failure with no underlying cause.
    pub fn operation(message: impl Into<String>) -> Self {
        GatewayError::Operation {
            message: message.into(),
            source: None,
        }
    }
}

impl From<RepositoryError> for GatewayError {
    fn from(err: RepositoryError) -> Self {
        GatewayError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(GatewayError::InvalidJson.to_string(), "Invalid JSON in request body");
        assert_eq!(GatewayError::NotFound.to_string(), "Endpoint not found");
        assert_eq!(
            GatewayError::Internal("boom".into()).to_string(),
            "Internal server error"
        );
        assert_eq!(
            GatewayError::operation("Failed to create web server instance").to_string(),
            "Failed to create web server instance"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::InvalidAction.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::NotFound.status(), StatusCode::NOT_FOUND);
        let db = GatewayError::from(RepositoryError::Unavailable("down".into()));
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.to_string(), "Database error");
    }
}
