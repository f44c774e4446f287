//! Provisioning API: dispatch and handlers.
//!
//! # Data Flow
//! ```text
//! ApiEvent
//!     → dispatch.rs (identity, route lookup, error → envelope)
//!     → handlers.rs (validate against the domain profile, call collaborators)
//!     → ApiResponse
//! ```

pub mod dispatch;
pub mod handlers;

pub use dispatch::{RequestRouter, RouterBuilder};
