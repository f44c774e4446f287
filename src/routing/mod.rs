//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming event (method, path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched Route or NoMatch
//!
//! Route Compilation (at startup and on reload):
//!     DomainProfile[]
//!     → /health, then per domain: list, create, manage, [applications]
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled once per configuration, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (table order)

pub mod matcher;
pub mod router;

pub use router::{RouteMatch, RouteTable, RouteTarget, HEALTH_PATH};
