// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/tandem/tandem.toml`, then the XDG user config, then
//! `./tandem.toml`, with `TANDEM_` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TandemConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tandem/tandem.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tandem.toml";

/// Top-level sections addressable from the environment.
const ENV_SECTIONS: [&str; 4] = ["agent", "provider", "daemon", "gateway"];

/// The user config path, `$XDG_CONFIG_HOME/tandem/tandem.toml` on Linux.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tandem").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the file hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tandem/tandem.toml`
/// 3. `~/.config/tandem/tandem.toml`
/// 4. `./tandem.toml`
/// 5. `TANDEM_*` environment variables
pub fn load_config() -> Result<TandemConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the defaults, ignoring the
/// environment.
pub fn load_config_from_str(toml_content: &str) -> Result<TandemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TandemConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
///
/// The file hierarchy is skipped entirely.
pub fn load_config_from_path(path: &Path) -> Result<TandemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TandemConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(TandemConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Only the first underscore after a section name becomes a dot, so
/// `TANDEM_PROVIDER_API_KEY` lands on `provider.api_key`.
fn env_provider() -> Env {
    Env::prefixed("TANDEM_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("provider_api_key"), "provider.api_key");
        assert_eq!(map_env_key("agent_data_dir"), "agent.data_dir");
        assert_eq!(map_env_key("daemon_discover_limit"), "daemon.discover_limit");
        assert_eq!(map_env_key("gateway_port"), "gateway.port");
    }

    #[test]
    fn nested_section_names_are_not_split_twice() {
        assert_eq!(map_env_key("agent_user_id"), "agent.user_id");
        assert_eq!(
            map_env_key("daemon_reflect_interval_hours"),
            "daemon.reflect_interval_hours"
        );
    }

    #[test]
    fn unknown_sections_pass_through() {
        assert_eq!(map_env_key("verbose"), "verbose");
        assert_eq!(map_env_key("agentx_name"), "agentx_name");
    }

    #[test]
    fn user_config_path_ends_with_tandem_toml() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with("tandem/tandem.toml"));
        }
    }
}
