// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Tandem assistant.
//!
//! This crate implements [`ProviderAdapter`] for the Gemini REST API,
//! providing single-shot completion, SSE streaming, and multi-turn chat.
//! Use [`register_gemini`] to make it available through a
//! [`ProviderRegistry`].

pub mod client;
pub mod sse;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::StreamExt;
use serde_json::Value;
use tandem_core::chat::normalize_chat;
use tandem_core::{
    ChatMessage, ProviderAdapter, ProviderConfig, ProviderKind, ProviderOptions, ProviderRegistry,
    ProviderResponse, Role, TandemError, TextStream,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// Gemini provider implementing [`ProviderAdapter`].
///
/// The HTTP client is built on [`initialize`](ProviderAdapter::initialize),
/// or lazily on the first call, and dropped again by
/// [`close`](ProviderAdapter::close).
pub struct GeminiProvider {
    config: ProviderConfig,
    client: RwLock<Option<GeminiClient>>,
}

impl GeminiProvider {
    /// Creates an uninitialized provider. No network I/O happens here.
    pub fn new(config: ProviderConfig) -> Result<Self, TandemError> {
        if config.provider != ProviderKind::Gemini {
            return Err(TandemError::Config(format!(
                "GeminiProvider cannot serve provider `{}`",
                config.provider
            )));
        }
        Ok(Self {
            config,
            client: RwLock::new(None),
        })
    }

    /// Returns the live client, building it first if needed.
    async fn client(&self) -> Result<GeminiClient, TandemError> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut slot = self.client.write().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = GeminiClient::new(
            &self.config.api_key,
            &self.config.model_name,
            self.config.base_url.as_deref(),
        )?;
        *slot = Some(client.clone());
        info!(model = %self.config.model_name, "Gemini provider initialized");
        Ok(client)
    }

    /// Builds a request body. `options` override the config's sampling
    /// parameters; unrecognized keys pass through into `generationConfig`.
    fn build_request(
        &self,
        contents: Vec<Content>,
        system: Option<&str>,
        options: &ProviderOptions,
    ) -> Result<GenerateContentRequest, TandemError> {
        let mut generation_config = GenerationConfig {
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            top_k: self.config.top_k,
            max_output_tokens: self.config.max_tokens,
            stop_sequences: self.config.stop_sequences.clone(),
            extra: serde_json::Map::new(),
        };

        let overrides = self
            .config
            .extra_params
            .iter()
            .flatten()
            .chain(options.iter());
        for (key, value) in overrides {
            apply_option(&mut generation_config, key, value)?;
        }

        let system_instruction = system
            .filter(|s| !s.trim().is_empty())
            .map(|s| Content::text(None, s));

        Ok(GenerateContentRequest {
            contents,
            system_instruction,
            generation_config,
        })
    }

    fn to_response(
        &self,
        parsed: GenerateContentResponse,
        raw: Value,
    ) -> Result<ProviderResponse, TandemError> {
        if parsed.candidates.is_empty() {
            let message = match parsed.block_reason() {
                Some(reason) => format!("Gemini blocked the prompt ({reason})"),
                None => "Gemini returned no candidates".to_string(),
            };
            return Err(TandemError::provider(message));
        }

        Ok(ProviderResponse {
            content: parsed.text(),
            model: self.config.model_name.clone(),
            provider: ProviderKind::Gemini,
            usage: parsed.usage(),
            finish_reason: parsed.finish_reason().map(str::to_string),
            raw: Some(raw),
        })
    }

    async fn send(&self, request: GenerateContentRequest) -> Result<ProviderResponse, TandemError> {
        let client = self.client().await?;
        let (parsed, raw) = client.generate_content(&request).await?;
        let response = self.to_response(parsed, raw)?;
        debug!(
            model = %response.model,
            finish_reason = ?response.finish_reason,
            total_tokens = response.usage.map(|u| u.total_tokens),
            "Gemini response"
        );
        Ok(response)
    }
}

/// Applies one option key, accepting both Gemini and snake_case spellings.
fn apply_option(
    config: &mut GenerationConfig,
    key: &str,
    value: &Value,
) -> Result<(), TandemError> {
    let invalid = || TandemError::provider(format!("invalid value for option `{key}`: {value}"));
    match key {
        "temperature" => config.temperature = value.as_f64().ok_or_else(invalid)? as f32,
        "topP" | "top_p" => config.top_p = value.as_f64().ok_or_else(invalid)? as f32,
        "topK" | "top_k" => {
            let top_k = value.as_u64().ok_or_else(invalid)?;
            config.top_k = Some(u32::try_from(top_k).map_err(|_| invalid())?);
        }
        "maxOutputTokens" | "max_tokens" | "max_output_tokens" => {
            let max = value.as_u64().ok_or_else(invalid)?;
            config.max_output_tokens = u32::try_from(max).map_err(|_| invalid())?;
        }
        "stopSequences" | "stop_sequences" => {
            config.stop_sequences =
                Some(serde_json::from_value(value.clone()).map_err(|_| invalid())?);
        }
        _ => {
            config.extra.insert(key.to_string(), value.clone());
        }
    }
    Ok(())
}

fn to_contents(messages: &[ChatMessage]) -> Vec<Content> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "model",
                Role::User | Role::System => "user",
            };
            Content::text(Some(role), m.content.clone())
        })
        .collect()
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn initialize(&self) -> Result<(), TandemError> {
        self.client().await.map(|_| ())
    }

    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        options: &ProviderOptions,
    ) -> Result<ProviderResponse, TandemError> {
        let request =
            self.build_request(vec![Content::text(Some("user"), prompt)], system, options)?;
        self.send(request).await
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        system: Option<&str>,
        options: &ProviderOptions,
    ) -> Result<TextStream, TandemError> {
        let request =
            self.build_request(vec![Content::text(Some("user"), prompt)], system, options)?;
        let client = self.client().await?;
        let chunks = client.stream_generate_content(&request).await?;

        let text = chunks.filter_map(|chunk| async move {
            match chunk {
                Ok(chunk) => {
                    if let Some(reason) = chunk.block_reason() {
                        return Some(Err(TandemError::provider(format!(
                            "Gemini blocked the prompt ({reason})"
                        ))));
                    }
                    let text = chunk.text();
                    (!text.is_empty()).then_some(Ok(text))
                }
                Err(e) => Some(Err(e)),
            }
        });
        Ok(Box::pin(text))
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ProviderOptions,
    ) -> Result<ProviderResponse, TandemError> {
        let turns = normalize_chat(messages)?;
        let request = self.build_request(to_contents(&turns), None, options)?;
        self.send(request).await
    }

    async fn close(&self) -> Result<(), TandemError> {
        if self.client.write().await.take().is_some() {
            info!("Gemini provider closed");
        }
        Ok(())
    }
}

/// Registers the Gemini backend under [`ProviderKind::Gemini`].
pub fn register_gemini(registry: &mut ProviderRegistry) {
    registry.register(
        ProviderKind::Gemini,
        |config: ProviderConfig| -> Result<Arc<dyn ProviderAdapter>, TandemError> {
            Ok(Arc::new(GeminiProvider::new(config)?))
        },
    );
}
