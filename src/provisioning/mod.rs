//! External collaborators of the router.
//!
//! The datastore and the compute API sit behind these traits and are
//! injected into the router. Only mock implementations ship: they serve
//! profile fixtures and fabricate identifiers from the clock.

pub mod provisioner;
pub mod repository;

pub use provisioner::{InstanceProvisioner, MockProvisioner, ProvisionError};
pub use repository::{InstanceRepository, MockInstanceRepository, RepositoryError, RepositoryResult};
