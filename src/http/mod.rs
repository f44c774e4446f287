//! HTTP and envelope handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware)
//!     → request.rs (request ID, identity header, body → ApiEvent)
//!     → event.rs (ApiEvent: gateway event shape)
//!     → api::RequestRouter
//!     → response.rs (ApiResponse → HTTP status, headers, body)
//!     → Send to client
//! ```
//!
//! The `invoke` command skips server.rs and request.rs: it reads an
//! `ApiEvent` as JSON and prints the `ApiResponse` envelope.

pub mod event;
pub mod request;
pub mod response;
pub mod server;

pub use event::ApiEvent;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ApiResponse;
pub use server::{AppState, HttpServer, RouterFactory};
