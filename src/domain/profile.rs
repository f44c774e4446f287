//! Domain profiles: the per-platform knobs of the router.
//!
//! A profile owns one URL namespace (`/{name}/...`) together with the
//! allow-lists that requests under it are validated against and the mock
//! data served from it.

use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ApplicationCatalog, DeployedApplication, InstanceAction, InstanceRecord, InstanceStatus,
    LoadBalancer,
};

/// Allow-list and default for the `application` field of create requests.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApplicationPolicy {
    pub allowed: Vec<String>,
    pub default: String,
}

/// Response wording for one domain. Unset fields fall back to text built
/// from the profile label, except `action_initiated`, which is omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileMessages {
    /// `message` of list responses.
    pub listed: Option<String>,

    /// Error body when a create request fails after validation.
    pub create_failed: Option<String>,

    /// Error body when a manage request fails after validation.
    pub manage_failed: Option<String>,

    /// Acknowledgment `message`; `{action}` is replaced with the action.
    pub action_initiated: Option<String>,
}

/// Configuration of one provisioning domain.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DomainProfile {
    /// Path segment, e.g. `web` for `/web/instances`.
    pub name: String,

    /// Human label used in response messages, e.g. `web server`.
    pub label: String,

    /// Accepted values for `instance_type`.
    pub instance_types: Vec<String>,

    /// Used when a create request omits `instance_type`.
    pub default_instance_type: String,

    /// Accepted values for `action` on manage requests.
    pub actions: Vec<InstanceAction>,

    /// Present when create requests carry an application.
    #[serde(default)]
    pub applications: Option<ApplicationPolicy>,

    /// Readiness estimate added to freshly created instances.
    #[serde(default)]
    pub ready_delay_secs: Option<u64>,

    /// Served on `GET /{name}/applications` when present.
    #[serde(default)]
    pub catalog: Option<ApplicationCatalog>,

    /// Records returned by the mock repository.
    #[serde(default)]
    pub fixtures: Vec<InstanceRecord>,

    #[serde(default)]
    pub messages: ProfileMessages,
}

impl DomainProfile {
    pub fn allows_instance_type(&self, instance_type: &str) -> bool {
        self.instance_types.iter().any(|t| t == instance_type)
    }

    pub fn allows_action(&self, action: InstanceAction) -> bool {
        self.actions.contains(&action)
    }

    /// Label with its first letter upper-cased, for sentence starts.
    pub fn title(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn list_message(&self) -> String {
        self.messages
            .listed
            .clone()
            .unwrap_or_else(|| format!("{} instances retrieved successfully", self.title()))
    }

    pub fn create_failure(&self) -> String {
        self.messages
            .create_failed
            .clone()
            .unwrap_or_else(|| format!("Failed to create {} instance", self.label))
    }

    pub fn manage_failure(&self) -> String {
        self.messages
            .manage_failed
            .clone()
            .unwrap_or_else(|| format!("Failed to manage {} instance", self.label))
    }

    /// Acknowledgment text for `action`, if this domain sends one.
    pub fn action_message(&self, action: InstanceAction) -> Option<String> {
        self.messages
            .action_initiated
            .as_ref()
            .map(|template| template.replace("{action}", action.as_str()))
    }

    pub fn instances_path(&self) -> String {
        format!("/{}/instances", self.name)
    }

    pub fn applications_path(&self) -> String {
        format!("/{}/applications", self.name)
    }

    /// The GPU-backed gaming platform.
    pub fn gaming() -> Self {
        Self {
            name: "gaming".to_string(),
            label: "gaming server".to_string(),
            instance_types: strings(&["g4dn.xlarge", "g4dn.2xlarge", "g5.xlarge"]),
            default_instance_type: "g4dn.xlarge".to_string(),
            actions: vec![
                InstanceAction::Start,
                InstanceAction::Stop,
                InstanceAction::Terminate,
            ],
            applications: None,
            ready_delay_secs: None,
            catalog: None,
            fixtures: Vec::new(),
            messages: ProfileMessages {
                listed: Some("No active gaming instances found".to_string()),
                create_failed: Some("Failed to create instance".to_string()),
                manage_failed: Some("Failed to manage instance".to_string()),
                action_initiated: None,
            },
        }
    }

    /// The web application deployment platform.
    pub fn web() -> Self {
        let mut first = fixture("i-web-12345", "t3.micro", "2024-09-26T10:00:00Z");
        first.application = Some("Apache Web Server".to_string());
        first.availability_zone = Some("us-east-1a".to_string());
        first.public_ip = Some("54.123.45.67".to_string());

        let mut second = fixture("i-web-67890", "t3.micro", "2024-09-26T10:05:00Z");
        second.application = Some("Apache Web Server".to_string());
        second.availability_zone = Some("us-east-1b".to_string());
        second.public_ip = Some("54.123.45.68".to_string());

        Self {
            name: "web".to_string(),
            label: "web server".to_string(),
            instance_types: strings(&["t3.micro", "t3.small", "t3.medium"]),
            default_instance_type: "t3.micro".to_string(),
            actions: vec![
                InstanceAction::Start,
                InstanceAction::Stop,
                InstanceAction::Restart,
                InstanceAction::Terminate,
            ],
            applications: Some(ApplicationPolicy {
                allowed: strings(&["apache", "nginx", "nodejs", "python-flask"]),
                default: "apache".to_string(),
            }),
            ready_delay_secs: Some(300),
            catalog: Some(ApplicationCatalog {
                applications: vec![
                    DeployedApplication {
                        name: "Demo Website".to_string(),
                        url: "http://alb-dns-name/".to_string(),
                        status: "active".to_string(),
                        instances: strings(&["i-web-12345", "i-web-67890"]),
                        health_check: "passing".to_string(),
                    },
                    DeployedApplication {
                        name: "API Service".to_string(),
                        url: "http://alb-dns-name/api/".to_string(),
                        status: "active".to_string(),
                        instances: strings(&["i-web-12345"]),
                        health_check: "passing".to_string(),
                    },
                ],
                load_balancer: LoadBalancer {
                    dns_name: "example-alb-123456789.us-east-1.elb.amazonaws.com".to_string(),
                    status: "active".to_string(),
                },
            }),
            fixtures: vec![first, second],
            messages: ProfileMessages {
                action_initiated: Some(
                    "Web server instance {action} initiated successfully".to_string(),
                ),
                ..ProfileMessages::default()
            },
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn fixture(id: &str, instance_type: &str, created_at: &str) -> InstanceRecord {
    InstanceRecord {
        instance_id: id.to_string(),
        instance_type: instance_type.to_string(),
        status: InstanceStatus::Running,
        application: None,
        availability_zone: None,
        public_ip: None,
        created_at: created_at.to_string(),
        owner_id: None,
    }
}
