//! Instance-facing data types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an instance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Pending,
    Launching,
    Running,
    Stopping,
    Stopped,
    Terminated,
}

impl InstanceStatus {
    pub fn is_terminated(self) -> bool {
        self == InstanceStatus::Terminated
    }
}

/// Management action requested against an existing instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceAction {
    Start,
    Stop,
    Restart,
    Terminate,
}

impl InstanceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceAction::Start => "start",
            InstanceAction::Stop => "stop",
            InstanceAction::Restart => "restart",
            InstanceAction::Terminate => "terminate",
        }
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl FromStr for InstanceAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(InstanceAction::Start),
            "stop" => Ok(InstanceAction::Stop),
            "restart" => Ok(InstanceAction::Restart),
            "terminate" => Ok(InstanceAction::Terminate),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// A stored instance as the datastore would return it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub instance_type: String,
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    pub created_at: String,
    /// Owning caller. `None` means visible to every caller.
    #[serde(default, skip_serializing)]
    pub owner_id: Option<String>,
}

/// Validated parameters for a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Path segment of the domain the request came through.
    pub domain: String,
    pub instance_type: String,
    pub application: Option<String>,
    /// Seconds until the instance is expected to be usable, if estimated.
    pub ready_delay_secs: Option<u64>,
}

/// Instance fabricated in response to a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchedInstance {
    pub instance_id: String,
    pub instance_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    pub status: InstanceStatus,
    pub user_id: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_ready_time: Option<String>,
}

/// Acknowledgment that a management action was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionAck {
    pub instance_id: String,
    pub action: InstanceAction,
    pub status: InstanceStatus,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Application deployed behind the platform load balancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployedApplication {
    pub name: String,
    pub url: String,
    pub status: String,
    pub instances: Vec<String>,
    pub health_check: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub dns_name: String,
    pub status: String,
}

/// Fixed listing of deployed applications for a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCatalog {
    pub applications: Vec<DeployedApplication>,
    pub load_balancer: LoadBalancer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!("restart".parse::<InstanceAction>(), Ok(InstanceAction::Restart));
        assert_eq!(
            "reboot".parse::<InstanceAction>(),
            Err(UnknownAction("reboot".into()))
        );
        // Actions are case-sensitive.
        assert!("START".parse::<InstanceAction>().is_err());
    }

    #[test]
    fn test_record_hides_owner() {
        let record = InstanceRecord {
            instance_id: "i-web-1".into(),
            instance_type: "t3.micro".into(),
            status: InstanceStatus::Running,
            application: None,
            availability_zone: None,
            public_ip: None,
            created_at: "2024-09-26T10:00:00Z".into(),
            owner_id: Some("alice".into()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "running");
        assert!(json.get("owner_id").is_none());
        assert!(json.get("application").is_none());
    }
}
