//! Provisioning domain model.
//!
//! # Data Flow
//! ```text
//! config (domains = [...])
//!     → profile.rs (allow-lists, defaults, mock fixtures per domain)
//!     → routing (one route group per profile)
//!     → api handlers validate request bodies against the profile
//!     → types.rs (records, launched instances, acknowledgments)
//! ```

pub mod profile;
pub mod types;

pub use profile::{ApplicationPolicy, DomainProfile, ProfileMessages};
pub use types::{
    ActionAck, ApplicationCatalog, DeployedApplication, InstanceAction, InstanceRecord,
    InstanceStatus, LaunchSpec, LaunchedInstance, LoadBalancer,
};
