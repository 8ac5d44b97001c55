// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tandem assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tandem_core::{ProviderConfig, ProviderKind, TandemError};

/// Environment variable consulted when `provider.api_key` is unset.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level Tandem configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TandemConfig {
    /// Identity, storage, and memory windows.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Model backend selection and sampling.
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Periodic discover/reflect timers.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// HTTP gateway bind address.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Agent identity and session behavior.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Profile used by the CLI and daemon, and by the gateway when a
    /// request names no user.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Display name for a newly created profile.
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Directory holding `profile_<id>.json` and `memory_<id>.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Interactions retained in memory.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Past interactions replayed as chat turns per message.
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Interactions summarized by a reflection pass.
    #[serde(default = "default_reflection_window")]
    pub reflection_window: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            user_id: default_user_id(),
            user_name: default_user_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            max_history: default_max_history(),
            context_window: default_context_window(),
            reflection_window: default_reflection_window(),
        }
    }
}

fn default_agent_name() -> String {
    "tandem".to_string()
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_user_name() -> String {
    "User".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_history() -> usize {
    50
}

fn default_context_window() -> usize {
    5
}

fn default_reflection_window() -> usize {
    10
}

/// Model backend settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Registry identifier of the backend.
    #[serde(default = "default_kind")]
    pub kind: ProviderKind,

    /// API key. Falls back to `GEMINI_API_KEY` for the Gemini backend.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default)]
    pub top_k: Option<u32>,

    #[serde(default)]
    pub stop_sequences: Option<Vec<String>>,

    /// Endpoint override for proxies and tests.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            top_k: None,
            stop_sequences: None,
            base_url: None,
        }
    }
}

fn default_kind() -> ProviderKind {
    ProviderKind::Gemini
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_top_p() -> f32 {
    1.0
}

/// Longest accepted discovery interval: one week.
pub const MAX_DISCOVER_INTERVAL_MINS: u64 = 7 * 24 * 60;

/// Longest accepted reflection interval: thirty days.
pub const MAX_REFLECT_INTERVAL_HOURS: u64 = 30 * 24;

/// Background daemon schedule.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    #[serde(default = "default_discover_interval_mins")]
    pub discover_interval_mins: u64,

    #[serde(default = "default_reflect_interval_hours")]
    pub reflect_interval_hours: u64,

    /// Items requested per discovery pass.
    #[serde(default = "default_discover_limit")]
    pub discover_limit: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            discover_interval_mins: default_discover_interval_mins(),
            reflect_interval_hours: default_reflect_interval_hours(),
            discover_limit: default_discover_limit(),
        }
    }
}

fn default_discover_interval_mins() -> u64 {
    30
}

fn default_reflect_interval_hours() -> u64 {
    6
}

fn default_discover_limit() -> usize {
    5
}

/// HTTP gateway settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl TandemConfig {
    /// Builds the provider config, resolving the API key from
    /// `provider.api_key` and then `GEMINI_API_KEY`.
    pub fn provider_config(&self) -> Result<ProviderConfig, TandemError> {
        let fallback = match self.provider.kind {
            ProviderKind::Gemini => std::env::var(GEMINI_API_KEY_ENV).ok(),
            _ => None,
        };
        self.provider_config_with_fallback(fallback)
    }

    /// Same as [`provider_config`](Self::provider_config) with an explicit
    /// fallback key in place of the environment lookup.
    pub fn provider_config_with_fallback(
        &self,
        fallback_key: Option<String>,
    ) -> Result<ProviderConfig, TandemError> {
        let settings = &self.provider;
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or(fallback_key.filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                TandemError::Config(format!(
                    "no API key for provider `{}`: set provider.api_key, TANDEM_PROVIDER_API_KEY, or {GEMINI_API_KEY_ENV}",
                    settings.kind
                ))
            })?;

        let mut config = ProviderConfig::new(settings.kind, settings.model.clone(), api_key)
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens)
            .with_top_p(settings.top_p);
        config.top_k = settings.top_k;
        config.stop_sequences = settings.stop_sequences.clone();
        config.base_url = settings.base_url.clone();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TandemConfig::default();
        assert_eq!(config.agent.user_id, "default");
        assert_eq!(config.agent.max_history, 50);
        assert_eq!(config.agent.context_window, 5);
        assert_eq!(config.agent.reflection_window, 10);
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.daemon.discover_interval_mins, 30);
        assert_eq!(config.daemon.reflect_interval_hours, 6);
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn configured_key_wins_over_fallback() {
        let mut config = TandemConfig::default();
        config.provider.api_key = Some("from-file".into());
        let provider = config
            .provider_config_with_fallback(Some("from-env".into()))
            .unwrap();
        assert_eq!(provider.api_key, "from-file");
        assert_eq!(provider.model_name, "gemini-2.0-flash");
    }

    #[test]
    fn fallback_key_used_when_unset_or_blank() {
        let mut config = TandemConfig::default();
        config.provider.api_key = Some("  ".into());
        let provider = config
            .provider_config_with_fallback(Some("from-env".into()))
            .unwrap();
        assert_eq!(provider.api_key, "from-env");
    }

    #[test]
    fn missing_key_is_config_error() {
        let config = TandemConfig::default();
        let err = config.provider_config_with_fallback(None).unwrap_err();
        assert!(matches!(err, TandemError::Config(ref m) if m.contains("GEMINI_API_KEY")));
    }

    #[test]
    fn sampling_settings_carry_over() {
        let mut config = TandemConfig::default();
        config.provider.top_k = Some(40);
        config.provider.stop_sequences = Some(vec!["END".into()]);
        config.provider.base_url = Some("http://localhost:9999".into());
        config.provider.max_tokens = 512;
        let provider = config.provider_config_with_fallback(Some("k".into())).unwrap();
        assert_eq!(provider.top_k, Some(40));
        assert_eq!(provider.stop_sequences, Some(vec!["END".to_string()]));
        assert_eq!(provider.base_url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(provider.max_tokens, 512);
    }
}
