//! Inbound event envelope.
//!
//! Mirrors the shape an API gateway hands to a function: method, path, raw
//! body string and the identity resolved by the authorizer. Every field is
//! optional on the wire; accessors apply the defaults.

use serde::{Deserialize, Serialize};

/// Identity used when the authorizer supplied none.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RequestContext {
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorizer {
    #[serde(default)]
    pub principal_id: Option<String>,
}

impl ApiEvent {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: Some(method.into()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_principal(mut self, principal_id: impl Into<String>) -> Self {
        self.request_context = Some(RequestContext {
            authorizer: Some(Authorizer {
                principal_id: Some(principal_id.into()),
            }),
        });
        self
    }

    /// Request method, `GET` when absent.
    pub fn method(&self) -> &str {
        self.http_method.as_deref().unwrap_or("GET")
    }

    /// Request path, `/` when absent.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    /// Raw body, `{}` when absent.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or("{}")
    }

    /// Caller identity, [`ANONYMOUS`] when the authorizer gave none.
    pub fn principal_id(&self) -> &str {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.authorizer.as_ref())
            .and_then(|auth| auth.principal_id.as_deref())
            .unwrap_or(ANONYMOUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_gateway_event() {
        let event: ApiEvent = serde_json::from_value(json!({
            "httpMethod": "POST",
            "path": "/web/instances",
            "body": "{\"instance_type\":\"t3.small\"}",
            "headers": {"Host": "example.com"},
            "requestContext": {"authorizer": {"principalId": "user-42"}}
        }))
        .unwrap();

        assert_eq!(event.method(), "POST");
        assert_eq!(event.path(), "/web/instances");
        assert_eq!(event.principal_id(), "user-42");
        assert!(event.body().contains("t3.small"));
    }

    #[test]
    fn test_defaults() {
        let event: ApiEvent = serde_json::from_value(json!({})).unwrap();
        assert_eq!(event.method(), "GET");
        assert_eq!(event.path(), "/");
        assert_eq!(event.body(), "{}");
        assert_eq!(event.principal_id(), ANONYMOUS);

        let event: ApiEvent =
            serde_json::from_value(json!({"requestContext": {"authorizer": {}}})).unwrap();
        assert_eq!(event.principal_id(), ANONYMOUS);
    }

    #[test]
    fn test_builder() {
        let event = ApiEvent::new("PUT", "/gaming/instances/i-1")
            .with_body(r#"{"action":"stop"}"#)
            .with_principal("bob");
        assert_eq!(event.principal_id(), "bob");
        assert_eq!(event.body(), r#"{"action":"stop"}"#);
    }
}
