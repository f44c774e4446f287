//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router that forwards every request to the gateway
//! - Wire up middleware (tracing, request ID, body limit, timeout, panics)
//! - Convert HTTP requests to events and envelopes back to HTTP responses
//! - Swap in a rebuilt router when configuration changes
//! - Serve until shutdown is signalled

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::RequestRouter;
use crate::config::{GatewayConfig, ListenerConfig};
use crate::http::request::{into_event, request_id, UuidRequestId};
use crate::http::response::ApiResponse;

/// Builds a router for a configuration; called at startup and on every reload.
pub type RouterFactory = Arc<dyn Fn(&GatewayConfig) -> RequestRouter + Send + Sync>;

/// Everything a request needs, replaced as a unit on reload.
pub struct GatewayState {
    pub router: RequestRouter,
    pub identity_header: HeaderName,
    pub body_limit: usize,
    pub bind_address: String,
}

impl GatewayState {
    fn build(config: &GatewayConfig, factory: &RouterFactory) -> Self {
        Self {
            router: factory(config),
            identity_header: identity_header(&config.listener),
            body_limit: config.listener.max_body_size,
            bind_address: config.listener.bind_address.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    current: Arc<ArcSwap<GatewayState>>,
    factory: RouterFactory,
}

impl AppState {
    pub fn new(config: &GatewayConfig, factory: RouterFactory) -> Self {
        let state = GatewayState::build(config, &factory);
        Self {
            current: Arc::new(ArcSwap::from_pointee(state)),
            factory,
        }
    }

    /// Snapshot of the state serving new requests.
    pub fn current(&self) -> Arc<GatewayState> {
        self.current.load_full()
    }

    /// Rebuild the router from `config` and make it current.
    pub fn reload(&self, config: &GatewayConfig) {
        let next = GatewayState::build(config, &self.factory);
        let previous = self.current.swap(Arc::new(next));

        if previous.bind_address != config.listener.bind_address {
            tracing::warn!(
                current = %previous.bind_address,
                requested = %config.listener.bind_address,
                "Listener address changes take effect after restart"
            );
        }
        tracing::info!(domains = config.domains.len(), "Configuration reloaded");
    }
}

/// HTTP front end for the gateway.
pub struct HttpServer {
    app: Router,
    state: AppState,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server backed by the mock collaborators.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_factory(config, Arc::new(RequestRouter::from_config))
    }

    /// Create a server whose routers come from `factory`.
    pub fn with_factory(config: GatewayConfig, factory: RouterFactory) -> Self {
        let state = AppState::new(&config, factory);
        let app = Self::build_router(&config, state.clone());
        Self { app, state, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut app = Router::new()
            .fallback(gateway_handler)
            .with_state(state.clone())
            .layer(CatchPanicLayer::custom(panic_responder(state)))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size));

        // Responses produced by the layers above never reach the router, so
        // give them the CORS headers here.
        let cors = [
            ("access-control-allow-origin", &config.cors.allow_origin),
            ("access-control-allow-methods", &config.cors.allow_methods),
            ("access-control-allow-headers", &config.cors.allow_headers),
        ];
        for (name, value) in cors {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    app = app.layer(SetResponseHeaderLayer::if_not_present(
                        HeaderName::from_static(name),
                        value,
                    ));
                }
                Err(_) => tracing::warn!(header = name, "Skipping invalid CORS header value"),
            }
        }

        app.layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` replace the router; the
    /// server stops once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            domains = self.config.domains.len(),
            "HTTP server starting"
        );

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.reload(&config);
            }
        });

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered axum app, for in-process use.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Forwards every request to the gateway router.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).unwrap_or("unknown").to_string();
    let current = state.current();

    let event = match into_event(request, &current.identity_header, current.body_limit).await {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting request body");
            return ApiResponse::error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
                current.router.headers(),
            )
            .into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %event.method(),
        path = %event.path(),
        "Dispatching request"
    );

    current.router.handle(&event).into_response()
}

/// Panics answer with the headers of whichever router is current.
fn panic_responder(
    state: AppState,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |panic| {
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(panic = %detail, "Request handler panicked");
        ApiResponse::internal_error(state.current().router.headers()).into_response()
    }
}

fn identity_header(listener: &ListenerConfig) -> HeaderName {
    HeaderName::from_bytes(listener.identity_header.as_bytes()).unwrap_or_else(|_| {
        tracing::warn!(
            header = %listener.identity_header,
            "Invalid identity header, falling back to x-principal-id"
        );
        HeaderName::from_static("x-principal-id")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_over_http() {
        let server = HttpServer::new(GatewayConfig::default());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, headers, body) = send(server.app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["x-platform"], "EC2-Deployment-Automation");
        assert!(headers.contains_key("x-request-id"));
        assert!(body.contains("\"healthy\""));
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let server = HttpServer::new(GatewayConfig::default());
        let request = Request::builder()
            .uri("/unknown")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(server.app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers["x-request-id"], "req-123");
    }

    #[tokio::test]
    async fn test_identity_header() {
        let server = HttpServer::new(GatewayConfig::default());
        let request = Request::builder()
            .method("PUT")
            .uri("/web/instances/i-web-12345")
            .header("x-principal-id", "carol")
            .body(Body::from(r#"{"action":"restart"}"#))
            .unwrap();

        let (status, _, body) = send(server.app(), request).await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["user_id"], "carol");
        assert_eq!(body["instance_id"], "i-web-12345");
    }

    #[tokio::test]
    async fn test_oversized_body_keeps_cors() {
        let mut config = GatewayConfig::default();
        config.listener.max_body_size = 8;
        let server = HttpServer::new(config);
        let request = Request::builder()
            .method("POST")
            .uri("/web/instances")
            .header("content-length", "64")
            .body(Body::from("x".repeat(64)))
            .unwrap();

        let (status, headers, _) = send(server.app(), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET,POST,PUT,DELETE");
    }

    #[tokio::test]
    async fn test_reload_swaps_router() {
        let server = HttpServer::new(GatewayConfig::for_variant(Variant::Web));
        let app = server.app();

        let request = || Request::builder().uri("/gaming/instances").body(Body::empty()).unwrap();
        let (status, _, _) = send(app.clone(), request()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        server.state().reload(&GatewayConfig::for_variant(Variant::Gaming));
        let (status, headers, body) = send(app, request()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!headers.contains_key("x-platform"));
        assert!(body.contains("No active gaming instances found"));
    }

    struct PanickingProvisioner;

    impl crate::provisioning::InstanceProvisioner for PanickingProvisioner {
        fn launch(
            &self,
            _: &crate::domain::LaunchSpec,
            _: &str,
        ) -> Result<crate::domain::LaunchedInstance, crate::provisioning::ProvisionError> {
            panic!("compute client exploded")
        }

        fn submit_action(
            &self,
            _: &str,
            _: crate::domain::InstanceAction,
            _: &str,
        ) -> Result<crate::domain::InstanceStatus, crate::provisioning::ProvisionError> {
            panic!("compute client exploded")
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let factory: RouterFactory = Arc::new(|config: &GatewayConfig| {
            RequestRouter::builder(config)
                .provisioner(Arc::new(PanickingProvisioner))
                .build()
        });
        let server = HttpServer::with_factory(GatewayConfig::default(), factory);
        let request = Request::builder()
            .method("POST")
            .uri("/web/instances")
            .body(Body::from("{}"))
            .unwrap();

        let (status, headers, body) = send(server.app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["x-platform"], "EC2-Deployment-Automation");
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_panic_after_reload_uses_current_headers() {
        let factory: RouterFactory = Arc::new(|config: &GatewayConfig| {
            RequestRouter::builder(config)
                .provisioner(Arc::new(PanickingProvisioner))
                .build()
        });
        let server = HttpServer::with_factory(GatewayConfig::for_variant(Variant::Web), factory);
        server.state().reload(&GatewayConfig::for_variant(Variant::Gaming));

        let request = Request::builder()
            .method("PUT")
            .uri("/gaming/instances/i-1")
            .body(Body::from(r#"{"action":"stop"}"#))
            .unwrap();

        let (status, headers, _) = send(server.app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(!headers.contains_key("x-platform"));
    }
}
