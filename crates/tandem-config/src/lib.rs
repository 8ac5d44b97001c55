// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Tandem assistant.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use tandem_config::{load_and_validate, render_errors};
//!
//! match load_and_validate() {
//!     Ok(config) => println!("data dir: {}", config.agent.data_dir.display()),
//!     Err(errors) => render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AgentConfig, DaemonConfig, GatewayConfig, ProviderSettings, TandemConfig};

/// Load configuration from the file hierarchy and validate it.
pub fn load_and_validate() -> Result<TandemConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TandemConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from one explicit file and validate it.
///
/// Unlike the hierarchy lookup, a missing file is an error here.
pub fn load_and_validate_path(path: &Path) -> Result<TandemConfig, Vec<ConfigError>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        vec![ConfigError::Other(format!(
            "cannot read config file {}: {e}",
            path.display()
        ))]
    })?;
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![(path.display().to_string(), content)];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Reads the hierarchy's TOML files for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_FILE) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_FILE).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    if let Ok(content) = std::fs::read_to_string(loader::SYSTEM_CONFIG_PATH) {
        sources.push((loader::SYSTEM_CONFIG_PATH.to_string(), content));
    }

    sources
}
