// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider and session construction shared by every command.

use std::sync::Arc;

use tandem_agent::{AgentSession, SessionOptions};
use tandem_config::TandemConfig;
use tandem_core::{ProviderAdapter, ProviderRegistry, TandemError};
use tandem_profile::UserProfile;
use tracing::warn;

/// Every backend this binary knows how to build.
pub fn build_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    tandem_gemini::register_gemini(&mut registry);
    registry
}

/// Builds and initializes the configured provider.
pub async fn create_provider(
    config: &TandemConfig,
    registry: &ProviderRegistry,
) -> Result<Arc<dyn ProviderAdapter>, TandemError> {
    let provider = registry.create(config.provider_config()?)?;
    provider.initialize().await?;
    Ok(provider)
}

/// Like [`create_provider`], but a failure only disables the provider.
///
/// Session commands still work without one: chat falls back to a fixed
/// reply and discovery returns nothing.
pub async fn optional_provider(
    config: &TandemConfig,
    registry: &ProviderRegistry,
) -> Option<Arc<dyn ProviderAdapter>> {
    match create_provider(config, registry).await {
        Ok(provider) => Some(provider),
        Err(e) => {
            warn!(error = %e, "continuing without a provider");
            None
        }
    }
}

pub fn session_options(config: &TandemConfig) -> SessionOptions {
    SessionOptions {
        max_history: config.agent.max_history,
        context_window: config.agent.context_window,
        reflection_window: config.agent.reflection_window,
    }
}

/// Opens the session for `user_id`, or the configured user.
pub fn open_session(
    config: &TandemConfig,
    provider: Option<Arc<dyn ProviderAdapter>>,
    user_id: Option<&str>,
) -> Result<AgentSession, TandemError> {
    let user_id = user_id.unwrap_or(&config.agent.user_id);
    let profile = UserProfile::create_default(Some(user_id), Some(&config.agent.user_name));
    AgentSession::open(
        provider,
        profile,
        &config.agent.data_dir,
        session_options(config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::ProviderKind;

    #[test]
    fn registry_contains_gemini() {
        assert_eq!(build_registry().registered(), vec![ProviderKind::Gemini]);
    }

    #[test]
    fn session_uses_configured_user_and_windows() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TandemConfig::default();
        config.agent.data_dir = dir.path().to_path_buf();
        config.agent.user_id = "carol".into();
        config.agent.max_history = 7;

        let session = open_session(&config, None, None).unwrap();
        assert_eq!(session.user_id(), "carol");
        assert_eq!(session.memory().max_history(), 7);

        let other = open_session(&config, None, Some("dave")).unwrap();
        assert_eq!(other.user_id(), "dave");
    }

    #[tokio::test]
    async fn missing_key_disables_provider() {
        let mut config = TandemConfig::default();
        config.provider.api_key = Some("   ".into());
        let registry = build_registry();
        // Only meaningful when the environment carries no key either.
        if std::env::var(tandem_config::model::GEMINI_API_KEY_ENV).is_err() {
            assert!(optional_provider(&config, &registry).await.is_none());
        }
    }
}
