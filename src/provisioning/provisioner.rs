//! Compute provisioning.

use chrono::TimeDelta;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::{iso, Clock, ID_FORMAT};
use crate::domain::{InstanceAction, InstanceStatus, LaunchSpec, LaunchedInstance};

/// Errors surfaced by the compute API.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The compute API refused the request.
    #[error("provisioning request rejected: {0}")]
    Rejected(String),

    /// The compute API could not be reached.
    #[error("provisioning API unavailable: {0}")]
    Unavailable(String),
}

/// Creates instances and forwards management actions.
pub trait InstanceProvisioner: Send + Sync {
    /// Request a new instance for `owner_id`.
    fn launch(&self, spec: &LaunchSpec, owner_id: &str) -> Result<LaunchedInstance, ProvisionError>;

    /// Queue `action` on an existing instance, returning its resulting status.
    fn submit_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
        owner_id: &str,
    ) -> Result<InstanceStatus, ProvisionError>;
}

/// Fabricates instances without calling anything.
#[derive(Clone)]
pub struct MockProvisioner {
    clock: Arc<dyn Clock>,
}

impl MockProvisioner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl InstanceProvisioner for MockProvisioner {
    fn launch(&self, spec: &LaunchSpec, owner_id: &str) -> Result<LaunchedInstance, ProvisionError> {
        let now = self.clock.now();

        let estimated_ready_time = match spec.ready_delay_secs {
            Some(secs) => {
                let ready = i64::try_from(secs)
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .and_then(|delay| now.checked_add_signed(delay))
                    .ok_or_else(|| {
                        ProvisionError::Rejected(format!("readiness delay of {secs}s is out of range"))
                    })?;
                Some(iso(ready))
            }
            None => None,
        };

        let instance = LaunchedInstance {
            instance_id: format!("i-{}-{}", spec.domain, now.format(ID_FORMAT)),
            instance_type: spec.instance_type.clone(),
            application: spec.application.clone(),
            status: InstanceStatus::Launching,
            user_id: owner_id.to_string(),
            created_at: iso(now),
            estimated_ready_time,
        };

        tracing::info!(
            instance_id = %instance.instance_id,
            instance_type = %instance.instance_type,
            owner_id,
            "Fabricated mock instance"
        );
        Ok(instance)
    }

    fn submit_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
        owner_id: &str,
    ) -> Result<InstanceStatus, ProvisionError> {
        tracing::info!(instance_id, %action, owner_id, "Accepted mock instance action");
        Ok(InstanceStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn provisioner() -> MockProvisioner {
        MockProvisioner::new(Arc::new(FixedClock::parse("2024-09-26T10:00:00").unwrap()))
    }

    fn spec(ready: Option<u64>) -> LaunchSpec {
        LaunchSpec {
            domain: "web".into(),
            instance_type: "t3.small".into(),
            application: Some("nginx".into()),
            ready_delay_secs: ready,
        }
    }

    #[test]
    fn test_launch_fabricates_identifier() {
        let launched = provisioner().launch(&spec(Some(300)), "alice").unwrap();
        assert_eq!(launched.instance_id, "i-web-20240926100000");
        assert_eq!(launched.status, InstanceStatus::Launching);
        assert_eq!(launched.user_id, "alice");
        assert_eq!(launched.created_at, "2024-09-26T10:00:00.000000");
        assert_eq!(
            launched.estimated_ready_time.as_deref(),
            Some("2024-09-26T10:05:00.000000")
        );
    }

    #[test]
    fn test_launch_without_estimate() {
        let launched = provisioner().launch(&spec(None), "alice").unwrap();
        assert!(launched.estimated_ready_time.is_none());
    }

    #[test]
    fn test_launch_rejects_absurd_delay() {
        let err = provisioner().launch(&spec(Some(u64::MAX)), "alice").unwrap_err();
        assert!(matches!(err, ProvisionError::Rejected(_)));
    }

    #[test]
    fn test_submit_action_is_pending() {
        let status = provisioner()
            .submit_action("i-web-1", InstanceAction::Stop, "alice")
            .unwrap();
        assert_eq!(status, InstanceStatus::Pending);
    }
}
