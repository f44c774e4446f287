use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a launch request. Unset fields take the domain defaults.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LaunchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

/// A gateway reply: status code plus the decoded JSON body.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub request_id: Option<String>,
    pub body: Value,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `error` field of a failure body.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

pub struct GatewayClient {
    client: Client,
    gateway_url: String,
    identity_header: String,
    principal: Option<String>,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Self {
        Self {
            client: Client::new(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            identity_header: "x-principal-id".to_string(),
            principal: None,
        }
    }

    /// Send `principal` as the caller identity on every request.
    pub fn with_principal(mut self, principal: &str) -> Self {
        self.principal = Some(principal.to_string());
        self
    }

    /// Override the identity header name (default `x-principal-id`).
    pub fn with_identity_header(mut self, header: &str) -> Self {
        self.identity_header = header.to_string();
        self
    }

    pub async fn health(&self) -> Result<GatewayResponse, reqwest::Error> {
        self.send(self.client.get(self.url("/health"))).await
    }

    pub async fn list_instances(&self, domain: &str) -> Result<GatewayResponse, reqwest::Error> {
        self.send(self.client.get(self.url(&format!("/{domain}/instances"))))
            .await
    }

    pub async fn launch_instance(
        &self,
        domain: &str,
        req: &LaunchRequest,
    ) -> Result<GatewayResponse, reqwest::Error> {
        self.send(
            self.client
                .post(self.url(&format!("/{domain}/instances")))
                .json(req),
        )
        .await
    }

    /// Submit a lifecycle action (`start`, `stop`, ...) for an instance.
    pub async fn manage_instance(
        &self,
        domain: &str,
        instance_id: &str,
        action: &str,
    ) -> Result<GatewayResponse, reqwest::Error> {
        self.send(
            self.client
                .put(self.url(&format!("/{domain}/instances/{instance_id}")))
                .json(&serde_json::json!({ "action": action })),
        )
        .await
    }

    pub async fn list_applications(&self, domain: &str) -> Result<GatewayResponse, reqwest::Error> {
        self.send(self.client.get(self.url(&format!("/{domain}/applications"))))
            .await
    }

    /// Send a raw body to an arbitrary path.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<String>,
    ) -> Result<GatewayResponse, reqwest::Error> {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(body) = body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        self.send(builder).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.gateway_url, path)
    }

    async fn send(
        &self,
        mut builder: reqwest::RequestBuilder,
    ) -> Result<GatewayResponse, reqwest::Error> {
        if let Some(principal) = &self.principal {
            builder = builder.header(self.identity_header.as_str(), principal.as_str());
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(GatewayResponse {
            status,
            request_id,
            body,
        })
    }
}
