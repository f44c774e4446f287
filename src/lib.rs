//! Mock instance-provisioning gateway library.

pub mod api;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod provisioning;
pub mod routing;

pub use api::RequestRouter;
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::{ApiEvent, ApiResponse, HttpServer};
pub use lifecycle::Shutdown;
