// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use tandem_core::persist::validate_user_id;

use crate::diagnostic::ConfigError;
use crate::model::{MAX_DISCOVER_INTERVAL_MINS, MAX_REFLECT_INTERVAL_HOURS, TandemConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &TandemConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let agent = &config.agent;

    if agent.name.trim().is_empty() {
        errors.push(ConfigError::validation("agent.name must not be empty"));
    }

    if validate_user_id(&agent.user_id).is_err() {
        errors.push(ConfigError::validation(format!(
            "agent.user_id `{}` must use ASCII letters, digits, `-`, `_`, or `.` and not start with `.`",
            agent.user_id
        )));
    }

    if agent.data_dir.as_os_str().is_empty() {
        errors.push(ConfigError::validation("agent.data_dir must not be empty"));
    }

    if !LOG_LEVELS.contains(&agent.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` is not one of: {}",
            agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    for (key, value) in [
        ("agent.max_history", agent.max_history),
        ("agent.context_window", agent.context_window),
        ("agent.reflection_window", agent.reflection_window),
        ("daemon.discover_limit", config.daemon.discover_limit),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!("{key} must be at least 1")));
        }
    }

    let provider = &config.provider;
    if provider.model.trim().is_empty() {
        errors.push(ConfigError::validation("provider.model must not be empty"));
    }
    if !(0.0..=2.0).contains(&provider.temperature) {
        errors.push(ConfigError::validation(format!(
            "provider.temperature must be within [0, 2], got {}",
            provider.temperature
        )));
    }
    if !(provider.top_p > 0.0 && provider.top_p <= 1.0) {
        errors.push(ConfigError::validation(format!(
            "provider.top_p must be within (0, 1], got {}",
            provider.top_p
        )));
    }
    if provider.max_tokens == 0 {
        errors.push(ConfigError::validation("provider.max_tokens must be at least 1"));
    }
    if let Some(url) = &provider.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "provider.base_url `{url}` must start with http:// or https://"
            )));
        }
    }

    let daemon = &config.daemon;
    if !(1..=MAX_DISCOVER_INTERVAL_MINS).contains(&daemon.discover_interval_mins) {
        errors.push(ConfigError::validation(format!(
            "daemon.discover_interval_mins must be within [1, {MAX_DISCOVER_INTERVAL_MINS}], got {}",
            daemon.discover_interval_mins
        )));
    }
    if !(1..=MAX_REFLECT_INTERVAL_HOURS).contains(&daemon.reflect_interval_hours) {
        errors.push(ConfigError::validation(format!(
            "daemon.reflect_interval_hours must be within [1, {MAX_REFLECT_INTERVAL_HOURS}], got {}",
            daemon.reflect_interval_hours
        )));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&TandemConfig::default()).is_ok());
    }

    #[test]
    fn unsafe_user_id_fails_validation() {
        let mut config = TandemConfig::default();
        config.agent.user_id = "../etc".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("agent.user_id")));
    }

    #[test]
    fn collects_every_violation() {
        let mut config = TandemConfig::default();
        config.agent.max_history = 0;
        config.agent.log_level = "loud".into();
        config.provider.temperature = 3.0;
        config.provider.top_p = 0.0;
        config.daemon.discover_interval_mins = 0;
        let errors = validate_config(&config).unwrap_err();
        let all = messages(&errors).join("\n");
        assert_eq!(errors.len(), 5, "{all}");
        assert!(all.contains("max_history"));
        assert!(all.contains("log_level"));
        assert!(all.contains("temperature"));
        assert!(all.contains("top_p"));
        assert!(all.contains("discover_interval_mins"));
    }

    #[test]
    fn deserialized_zero_windows_fail_validation() {
        let toml_str = r#"
[agent]
context_window = 0
reflection_window = 0
"#;
        let config: TandemConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn deny_unknown_fields_rejects_typos_before_validation() {
        let result = toml::from_str::<TandemConfig>("[daemon]
discover_intervall_mins = 5
");
        assert!(result.is_err());
    }

    #[test]
    fn daemon_intervals_are_capped() {
        let mut config = TandemConfig::default();
        config.daemon.discover_interval_mins = MAX_DISCOVER_INTERVAL_MINS;
        config.daemon.reflect_interval_hours = MAX_REFLECT_INTERVAL_HOURS;
        assert!(validate_config(&config).is_ok());

        config.daemon.discover_interval_mins = u64::MAX;
        config.daemon.reflect_interval_hours = MAX_REFLECT_INTERVAL_HOURS + 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = TandemConfig::default();
        config.agent.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn base_url_needs_scheme() {
        let mut config = TandemConfig::default();
        config.provider.base_url = Some("localhost:8080".into());
        assert!(validate_config(&config).is_err());
        config.provider.base_url = Some("http://localhost:8080".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn gateway_host_accepts_ip_and_hostname() {
        let mut config = TandemConfig::default();
        for host in ["0.0.0.0", "::1", "localhost", "agent.example.com"] {
            config.gateway.host = host.into();
            assert!(validate_config(&config).is_ok(), "{host}");
        }
        config.gateway.host = "bad host!".into();
        assert!(validate_config(&config).is_err());
    }
}
