//! Instance lookup by owner.

use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{DomainProfile, InstanceRecord};

/// Errors surfaced by an instance datastore.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Connection could not be established.
    #[error("datastore unavailable: {0}")]
    Unavailable(String),

    /// Query was rejected or failed mid-flight.
    #[error("query failed: {0}")]
    Query(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Read access to stored instances.
///
/// Implementations return the caller's non-terminated instances in the
/// given domain, newest first where the backing store keeps an order.
pub trait InstanceRepository: Send + Sync {
    fn list_instances(&self, domain: &str, owner_id: &str) -> RepositoryResult<Vec<InstanceRecord>>;
}

/// In-memory repository seeded from profile fixtures.
#[derive(Debug, Clone, Default)]
pub struct MockInstanceRepository {
    records: HashMap<String, Vec<InstanceRecord>>,
}

impl MockInstanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with each profile's fixtures.
    pub fn from_profiles(profiles: &[DomainProfile]) -> Self {
        let records = profiles
            .iter()
            .map(|p| (p.name.clone(), p.fixtures.clone()))
            .collect();
        Self { records }
    }

    /// Replace the records of one domain.
    pub fn with_instances(mut self, domain: impl Into<String>, records: Vec<InstanceRecord>) -> Self {
        self.records.insert(domain.into(), records);
        self
    }
}

impl InstanceRepository for MockInstanceRepository {
    fn list_instances(&self, domain: &str, owner_id: &str) -> RepositoryResult<Vec<InstanceRecord>> {
        let records = match self.records.get(domain) {
            Some(r) => r,
            None => return Ok(Vec::new()),
        };

        let visible: Vec<InstanceRecord> = records
            .iter()
            .filter(|r| !r.status.is_terminated())
            .filter(|r| r.owner_id.as_deref().map_or(true, |owner| owner == owner_id))
            .cloned()
            .collect();

        tracing::debug!(domain, owner_id, count = visible.len(), "Listed mock instances");
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstanceStatus;

    fn record(id: &str, status: InstanceStatus, owner: Option<&str>) -> InstanceRecord {
        InstanceRecord {
            instance_id: id.into(),
            instance_type: "t3.micro".into(),
            status,
            application: None,
            availability_zone: None,
            public_ip: None,
            created_at: "2024-09-26T10:00:00Z".into(),
            owner_id: owner.map(String::from),
        }
    }

    #[test]
    fn test_seeded_from_profiles() {
        let repo = MockInstanceRepository::from_profiles(&[DomainProfile::web()]);
        let listed = repo.list_instances("web", "anonymous").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].instance_id, "i-web-12345");
        assert!(repo.list_instances("gaming", "anonymous").unwrap().is_empty());
    }

    #[test]
    fn test_filters_terminated_and_foreign() {
        let repo = MockInstanceRepository::new().with_instances(
            "web",
            vec![
                record("i-1", InstanceStatus::Running, Some("alice")),
                record("i-2", InstanceStatus::Terminated, Some("alice")),
                record("i-3", InstanceStatus::Stopped, Some("bob")),
                record("i-4", InstanceStatus::Pending, None),
            ],
        );

        let ids: Vec<String> = repo
            .list_instances("web", "alice")
            .unwrap()
            .into_iter()
            .map(|r| r.instance_id)
            .collect();
        assert_eq!(ids, vec!["i-1", "i-4"]);
    }
}
