// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by provider adapters, stores, and the agent.

use std::fmt;
use std::pin::Pin;

use futures_core::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::TandemError;

/// Identifies an LLM backend in the provider registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
}

/// Tags for discovered content and for the allowed-types preference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[default]
    Article,
    Video,
    Paper,
    Podcast,
    SocialPost,
    CodeRepo,
    Other,
}

/// Opaque provider-specific options passed through to a backend.
pub type ProviderOptions = serde_json::Map<String, serde_json::Value>;

/// A lazily produced sequence of text fragments from a streaming generate call.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, TandemError>> + Send>>;

/// Model and sampling configuration for one provider instance.
///
/// A provider takes ownership of its config at construction and only hands
/// out shared references afterwards.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub model_name: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(default)]
    pub extra_params: Option<serde_json::Map<String, serde_json::Value>>,
    /// Endpoint override, used for self-hosted gateways and tests.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Creates a config with default sampling parameters.
    pub fn new(
        provider: ProviderKind,
        model_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            api_key: api_key.into(),
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 1.0,
            top_k: None,
            stop_sequences: None,
            extra_params: None,
            base_url: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_stop_sequences(mut self, stop: Vec<String>) -> Self {
        self.stop_sequences = Some(stop);
        self
    }

    pub fn with_extra_params(mut self, extra: serde_json::Map<String, serde_json::Value>) -> Self {
        self.extra_params = Some(extra);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Checks sampling ranges: temperature in [0, 2], top_p in (0, 1],
    /// max_tokens > 0, non-empty model name.
    pub fn validate(&self) -> Result<(), TandemError> {
        if self.model_name.trim().is_empty() {
            return Err(TandemError::Config("model name must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TandemError::Config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(TandemError::Config("max_tokens must be greater than 0".into()));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(TandemError::Config(format!(
                "top_p must be within (0, 1], got {}",
                self.top_p
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("api_key", &"[REDACTED]")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("stop_sequences", &self.stop_sequences)
            .field("extra_params", &self.extra_params)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A complete response from an LLM provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
    pub provider: ProviderKind,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Raw backend payload, kept for diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a multi-turn conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
