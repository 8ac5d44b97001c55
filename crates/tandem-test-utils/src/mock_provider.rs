// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses
//! and injected failures, enabling fast tests without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use tandem_core::{
    ChatMessage, ProviderAdapter, ProviderConfig, ProviderKind, ProviderOptions, ProviderResponse,
    TandemError, TextStream, TokenUsage,
};

/// Text returned when the queue is empty.
pub const DEFAULT_MOCK_REPLY: &str = "mock response";

/// Model name reported by mock responses.
pub const MOCK_MODEL: &str = "mock-model";

/// A single `generate` or `generate_stream` call as the provider saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPrompt {
    pub prompt: String,
    pub system: Option<String>,
}

/// A mock LLM provider that returns pre-configured responses.
///
/// Outcomes are popped from a FIFO queue shared by every generation call.
/// When the queue is empty, [`DEFAULT_MOCK_REPLY`] is returned.
pub struct MockProvider {
    config: ProviderConfig,
    outcomes: Mutex<VecDeque<Result<String, TandemError>>>,
    chats: Mutex<Vec<Vec<ChatMessage>>>,
    prompts: Mutex<Vec<CapturedPrompt>>,
    calls: AtomicUsize,
    initializations: AtomicUsize,
    closes: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self::with_kind(ProviderKind::Gemini)
    }

    /// Create a mock provider that reports `kind`.
    pub fn with_kind(kind: ProviderKind) -> Self {
        Self::from_config(ProviderConfig::new(kind, MOCK_MODEL, "mock-key"))
    }

    /// Create a mock provider that reports the given config.
    pub fn from_config(config: ProviderConfig) -> Self {
        Self {
            config,
            outcomes: Mutex::new(VecDeque::new()),
            chats: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            initializations: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let mut provider = Self::new();
        provider.outcomes = Mutex::new(responses.into_iter().map(Ok).collect());
        provider
    }

    /// Add a response to the end of the queue.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.outcomes.lock().await.push_back(Ok(text.into()));
    }

    /// Make a later call fail with `error`.
    pub async fn push_error(&self, error: TandemError) {
        self.outcomes.lock().await.push_back(Err(error));
    }

    /// Number of generation calls (`generate`, `generate_stream`, `chat`).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn initialize_count(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Every message list passed to `chat`, in call order.
    pub async fn captured_chats(&self) -> Vec<Vec<ChatMessage>> {
        self.chats.lock().await.clone()
    }

    /// Every prompt passed to `generate` or `generate_stream`, in call order.
    pub async fn captured_prompts(&self) -> Vec<CapturedPrompt> {
        self.prompts.lock().await.clone()
    }

    async fn next_outcome(&self) -> Result<String, TandemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_MOCK_REPLY.to_string()))
    }

    async fn capture_prompt(&self, prompt: &str, system: Option<&str>) {
        self.prompts.lock().await.push(CapturedPrompt {
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
        });
    }

    fn respond(&self, content: String) -> ProviderResponse {
        let completion_tokens = content.split_whitespace().count() as u32;
        ProviderResponse {
            content,
            model: self.config.model_name.clone(),
            provider: self.config.provider,
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens,
                total_tokens: 10 + completion_tokens,
            }),
            finish_reason: Some("STOP".to_string()),
            raw: None,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.config.provider
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn initialize(&self) -> Result<(), TandemError> {
        self.initializations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        _options: &ProviderOptions,
    ) -> Result<ProviderResponse, TandemError> {
        self.capture_prompt(prompt, system).await;
        let text = self.next_outcome().await?;
        Ok(self.respond(text))
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        system: Option<&str>,
        _options: &ProviderOptions,
    ) -> Result<TextStream, TandemError> {
        self.capture_prompt(prompt, system).await;
        let text = self.next_outcome().await?;

        // One fragment per word, trailing whitespace included, so the
        // fragments concatenate back to the full reply.
        let fragments: Vec<Result<String, TandemError>> = text
            .split_inclusive(' ')
            .map(|fragment| Ok(fragment.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(fragments)))
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _options: &ProviderOptions,
    ) -> Result<ProviderResponse, TandemError> {
        self.chats.lock().await.push(messages.to_vec());
        let normalized = tandem_core::chat::normalize_chat(messages)?;
        let text = self.next_outcome().await?;
        tracing::debug!(turns = normalized.len(), "mock chat");
        Ok(self.respond(text))
    }

    async fn close(&self) -> Result<(), TandemError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider
            .generate("hi", None, &ProviderOptions::new())
            .await
            .unwrap();
        assert_eq!(resp.content, DEFAULT_MOCK_REPLY);
        assert_eq!(resp.model, MOCK_MODEL);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn queued_outcomes_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first".into(), "second".into()]);
        provider.push_error(TandemError::provider_retryable("busy")).await;

        let opts = ProviderOptions::new();
        assert_eq!(provider.generate("a", None, &opts).await.unwrap().content, "first");
        assert_eq!(provider.generate("b", None, &opts).await.unwrap().content, "second");
        let err = provider.generate("c", None, &opts).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(provider.generate("d", None, &opts).await.unwrap().content, DEFAULT_MOCK_REPLY);
    }

    #[tokio::test]
    async fn stream_fragments_concatenate_to_reply() {
        let provider = MockProvider::with_responses(vec!["one two three".into()]);
        let stream = provider
            .generate_stream("p", Some("sys"), &ProviderOptions::new())
            .await
            .unwrap();
        let fragments: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments.concat(), "one two three");

        let prompts = provider.captured_prompts().await;
        assert_eq!(prompts[0].system.as_deref(), Some("sys"));
    }

    #[tokio::test]
    async fn chat_rejects_trailing_assistant_turn() {
        let provider = MockProvider::new();
        let messages = [ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let err = provider
            .chat(&messages, &ProviderOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_provider());
        assert_eq!(provider.call_count(), 0);
        assert_eq!(provider.captured_chats().await.len(), 1);
    }
}
