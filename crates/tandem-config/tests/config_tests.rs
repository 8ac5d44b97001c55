// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Tandem configuration system.

use std::path::PathBuf;

use tandem_config::diagnostic::ConfigError;
use tandem_config::model::TandemConfig;
use tandem_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use tandem_core::ProviderKind;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_tandem_config() {
    let toml = r#"
[agent]
name = "copilot"
user_id = "alice"
user_name = "Alice"
data_dir = "/var/lib/tandem"
log_level = "debug"
max_history = 100
context_window = 3
reflection_window = 20

[provider]
kind = "gemini"
api_key = "AIza-test"
model = "gemini-1.5-pro"
temperature = 0.2
max_tokens = 1024
top_p = 0.9
top_k = 40
stop_sequences = ["END"]
base_url = "http://localhost:9000/v1beta"

[daemon]
discover_interval_mins = 15
reflect_interval_hours = 12
discover_limit = 3

[gateway]
host = "0.0.0.0"
port = 9090
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "copilot");
    assert_eq!(config.agent.user_id, "alice");
    assert_eq!(config.agent.user_name, "Alice");
    assert_eq!(config.agent.data_dir, PathBuf::from("/var/lib/tandem"));
    assert_eq!(config.agent.max_history, 100);
    assert_eq!(config.agent.context_window, 3);
    assert_eq!(config.agent.reflection_window, 20);
    assert_eq!(config.provider.kind, ProviderKind::Gemini);
    assert_eq!(config.provider.api_key.as_deref(), Some("AIza-test"));
    assert_eq!(config.provider.model, "gemini-1.5-pro");
    assert_eq!(config.provider.top_k, Some(40));
    assert_eq!(config.provider.stop_sequences, Some(vec!["END".to_string()]));
    assert_eq!(config.daemon.discover_interval_mins, 15);
    assert_eq!(config.daemon.reflect_interval_hours, 12);
    assert_eq!(config.daemon.discover_limit, 3);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 9090);
}

/// Missing sections use defaults without error.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config, TandemConfig::default());
    assert_eq!(config.agent.data_dir, PathBuf::from("data"));
    assert!(config.provider.api_key.is_none());
}

/// A typo in [agent] yields an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_produces_suggestion() {
    let toml = "[agent]\nnaem = \"test\"\n";

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "naem");
            assert_eq!(suggestion.as_deref(), Some("name"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// A typo in [provider] is reported against the provider keys.
#[test]
fn unknown_provider_key_lists_valid_keys() {
    let toml = "[provider]\napi_kye = \"x\"\n";

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    match &errors[0] {
        ConfigError::UnknownKey {
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(suggestion.as_deref(), Some("api_key"));
            assert!(valid_keys.contains("base_url"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level sections are rejected too.
#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "telegram"));
}

/// Wrong value types surface as InvalidType.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { .. }),
        "got {errors:?}"
    );
}

/// An unsupported provider identifier is an invalid value.
#[test]
fn unknown_provider_kind_is_reported() {
    let errors = load_and_validate_str("[provider]\nkind = \"gemeni\"\n").unwrap_err();
    let message = errors[0].to_string();
    assert!(message.contains("gemeni"), "got: {message}");
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[agent]
user_id = ".hidden"
max_history = 0
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Overrides merged after the file win, as environment variables do.
#[test]
fn later_layers_override_file_values() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: TandemConfig = Figment::new()
        .merge(Serialized::defaults(TandemConfig::default()))
        .merge(Toml::string("[provider]\napi_key = \"from-toml\"\n"))
        .merge(("provider.api_key", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.provider.api_key.as_deref(), Some("from-env"));
}

/// An explicit path replaces the hierarchy.
#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[gateway]\nport = 8123\n").unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.gateway.port, 8123);
    assert_eq!(load_and_validate_path(&path).unwrap().gateway.port, 8123);
}

/// A missing explicit path is an error rather than silent defaults.
#[test]
fn missing_explicit_path_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let errors = load_and_validate_path(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Other(m) if m.contains("cannot read")));
}

/// Diagnostics render through miette without panicking.
#[test]
fn diagnostics_render() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let errors = load_and_validate_str("[agent]\nnaem = \"x\"\n").unwrap_err();
    let mut out = String::new();
    let diagnostic: &dyn Diagnostic = &errors[0];
    GraphicalReportHandler::new()
        .render_report(&mut out, diagnostic)
        .unwrap();
    assert!(out.contains("naem"));
}
