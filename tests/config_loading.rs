//! Configuration files, sample profiles and reload safety.

use std::io::Write;

use instance_gateway::config::{load_config, ConfigError, GatewayConfig, ValidationError, Variant};
use instance_gateway::http::ApiEvent;

mod common;

#[test]
fn test_sample_profiles_match_presets() {
    for variant in [Variant::Gaming, Variant::Web] {
        let path = common::profile_path(&variant.to_string());
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, GatewayConfig::for_variant(variant), "{}", path.display());
    }
}

#[test]
fn test_custom_domain_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
preset = "gaming"

[listener]
bind_address = "127.0.0.1:9000"

[[domains]]
name = "batch"
label = "batch worker"
instance_types = ["c5.large", "c5.xlarge"]
default_instance_type = "c5.large"
actions = ["start", "terminate"]
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.domains.len(), 1);
    assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    assert!(config.platform.is_none());

    let router = common::router(&config);
    let resp = router.handle(&ApiEvent::new("POST", "/batch/instances"));
    assert_eq!(resp.status_code, 201);
    let body = resp.body_json().unwrap();
    assert_eq!(body["instance_id"], "i-batch-20240926120000");
    assert_eq!(body["instance_type"], "c5.large");

    let resp = router.handle(
        &ApiEvent::new("PUT", "/batch/instances/i-1").with_body(r#"{"action":"stop"}"#),
    );
    assert_eq!(resp.status_code, 400);

    let resp = router.handle(&ApiEvent::new("GET", "/batch/instances"));
    let body = resp.body_json().unwrap();
    assert_eq!(body["message"], "Batch worker instances retrieved successfully");
    assert_eq!(body["instances"].as_array().unwrap().len(), 0);
}

#[test]
fn test_file_without_preset_has_no_platform() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[domains]]
name = "gaming"
label = "gaming server"
instance_types = ["g4dn.xlarge"]
default_instance_type = "g4dn.xlarge"
actions = ["start", "stop", "terminate"]
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.preset, None);
    assert!(config.platform.is_none());

    let resp = common::router(&config).handle(&ApiEvent::new("GET", "/health"));
    let body = resp.body_json().unwrap();
    assert!(body.get("platform").is_none());
    assert!(body.get("version").is_none());
    assert!(!resp.headers.contains_key("X-Platform"));
}

#[test]
fn test_every_problem_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[listener]
bind_address = "not-an-address"

[timeouts]
request_secs = 0

[[domains]]
name = "web/v2"
label = "web server"
instance_types = []
default_instance_type = "t3.micro"
actions = []
"#
    )
    .unwrap();

    let err = load_config(file.path()).unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation errors, got {err}");
    };
    assert!(errors.contains(&ValidationError::InvalidDomainName("web/v2".into())));
    assert!(errors.contains(&ValidationError::ZeroTimeout));
    assert!(errors.contains(&ValidationError::EmptyAllowList {
        domain: "web/v2".into(),
        field: "instance_types",
    }));
    assert!(errors.contains(&ValidationError::EmptyAllowList {
        domain: "web/v2".into(),
        field: "actions",
    }));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::InvalidAddress { field: "listener.bind_address", .. })));
}

#[test]
fn test_parse_and_io_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[[domains]]\nname = 5\n").unwrap();
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    assert!(matches!(load_config(&missing), Err(ConfigError::Io(_))));
}

#[tokio::test]
async fn test_invalid_reload_keeps_current_router() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    std::fs::copy(common::profile_path("gaming"), &path).unwrap();

    let config = load_config(&path).unwrap();
    let gateway = common::spawn_gateway(config).await;
    let client = gateway_sdk::GatewayClient::new(&gateway.url());

    // A broken edit never reaches the server: loading fails, nothing is sent.
    std::fs::write(&path, "[[domains]]\nname = \"\"\n").unwrap();
    if let Ok(config) = load_config(&path) {
        gateway.config_tx.send(config).unwrap();
    }

    let resp = client.list_instances("gaming").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["message"], "No active gaming instances found");

    gateway.stop().await;
}
