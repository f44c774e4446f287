//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve identity, method and path from the event
//! - Look up the route and invoke its handler
//! - Turn every outcome, failures included, into a response envelope
//!
//! # Design Decisions
//! - `handle` is total: it returns an envelope for any input
//! - Immutable after construction; shared via Arc and swapped on reload
//! - Collaborators and telemetry are injected, never global

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::api::handlers::{self, HandlerContext};
use crate::clock::{Clock, SystemClock};
use crate::config::{GatewayConfig, PlatformConfig};
use crate::domain::DomainProfile;
use crate::error::GatewayError;
use crate::http::event::ApiEvent;
use crate::http::response::ApiResponse;
use crate::observability::Telemetry;
use crate::provisioning::{
    InstanceProvisioner, InstanceRepository, MockInstanceRepository, MockProvisioner,
};
use crate::routing::{RouteMatch, RouteTable, RouteTarget};

/// Route name reported for requests that matched nothing.
const UNMATCHED: &str = "unmatched";

/// Maps one inbound event to one response envelope.
pub struct RequestRouter {
    domains: Vec<DomainProfile>,
    routes: RouteTable,
    platform: Option<PlatformConfig>,
    headers: BTreeMap<String, String>,
    repository: Arc<dyn InstanceRepository>,
    provisioner: Arc<dyn InstanceProvisioner>,
    clock: Arc<dyn Clock>,
    telemetry: Telemetry,
}

impl RequestRouter {
    pub fn builder(config: &GatewayConfig) -> RouterBuilder {
        RouterBuilder {
            config: config.clone(),
            repository: None,
            provisioner: None,
            clock: None,
            telemetry: None,
        }
    }

    /// Router backed by the mock collaborators and the wall clock.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::builder(config).build()
    }

    /// Fixed headers attached to every response.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn domains(&self) -> &[DomainProfile] {
        &self.domains
    }

    /// Handle an event given as untyped JSON.
    pub fn handle_value(&self, event: &Value) -> ApiResponse {
        match serde_json::from_value::<ApiEvent>(event.clone()) {
            Ok(event) => self.handle(&event),
            Err(e) => {
                let err = GatewayError::Internal(format!("malformed event: {e}"));
                self.telemetry.request_failed(UNMATCHED, &err);
                ApiResponse::internal_error(&self.headers)
            }
        }
    }

    /// Handle one event.
    pub fn handle(&self, event: &ApiEvent) -> ApiResponse {
        let started = Instant::now();
        let span = self.telemetry.request_span(event);
        let _enter = span.enter();
        self.telemetry.request_received(event);

        let (route, result) = match self.routes.match_request(event.method(), event.path()) {
            Some(matched) => (matched.name, self.dispatch(&matched, event)),
            None => (UNMATCHED, Err(GatewayError::NotFound)),
        };

        let response = result.unwrap_or_else(|err| {
            self.telemetry.request_failed(route, &err);
            ApiResponse::error(err.status(), &err.to_string(), &self.headers)
        });

        self.telemetry
            .request_completed(route, response.status(), started);
        response
    }

    fn dispatch(&self, matched: &RouteMatch<'_>, event: &ApiEvent) -> Result<ApiResponse, GatewayError> {
        let ctx = HandlerContext {
            headers: &self.headers,
            principal_id: event.principal_id(),
        };

        match matched.target {
            RouteTarget::Health => Ok(handlers::health(
                &ctx,
                self.clock.now(),
                self.platform.as_ref(),
            )),
            RouteTarget::ListInstances { domain } => {
                handlers::list_instances(&ctx, self.profile(domain)?, self.repository.as_ref())
            }
            RouteTarget::CreateInstance { domain } => handlers::create_instance(
                &ctx,
                self.profile(domain)?,
                event.body(),
                self.provisioner.as_ref(),
            ),
            RouteTarget::ManageInstance { domain } => handlers::manage_instance(
                &ctx,
                self.profile(domain)?,
                matched.instance_id.as_deref().unwrap_or_default(),
                event.body(),
                self.provisioner.as_ref(),
            ),
            RouteTarget::ListApplications { domain } => {
                handlers::list_applications(&ctx, self.profile(domain)?)
            }
        }
    }

    fn profile(&self, index: usize) -> Result<&DomainProfile, GatewayError> {
        self.domains
            .get(index)
            .ok_or_else(|| GatewayError::Internal(format!("route references unknown domain #{index}")))
    }
}

/// Assembles a [`RequestRouter`]; unset collaborators fall back to the mocks.
pub struct RouterBuilder {
    config: GatewayConfig,
    repository: Option<Arc<dyn InstanceRepository>>,
    provisioner: Option<Arc<dyn InstanceProvisioner>>,
    clock: Option<Arc<dyn Clock>>,
    telemetry: Option<Telemetry>,
}

impl RouterBuilder {
    pub fn repository(mut self, repository: Arc<dyn InstanceRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn provisioner(mut self, provisioner: Arc<dyn InstanceProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn build(self) -> RequestRouter {
        let config = self.config;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(MockInstanceRepository::from_profiles(&config.domains)));
        let provisioner = self
            .provisioner
            .unwrap_or_else(|| Arc::new(MockProvisioner::new(clock.clone())));
        let telemetry = self.telemetry.unwrap_or_else(|| {
            Telemetry::new(env!("CARGO_PKG_NAME"), config.observability.metrics_enabled)
        });

        RequestRouter {
            routes: RouteTable::from_profiles(&config.domains),
            headers: config.response_headers(),
            platform: config.platform,
            domains: config.domains,
            repository,
            provisioner,
            clock,
            telemetry,
        }
    }
}
