// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM backends (Gemini, OpenAI, etc.).

use async_trait::async_trait;

use crate::error::TandemError;
use crate::types::{
    ChatMessage, ProviderConfig, ProviderKind, ProviderOptions, ProviderResponse, TextStream,
};

/// Adapter for LLM provider integrations.
///
/// Every operation takes `&self`; implementations keep their client behind
/// interior mutability so one instance can be shared as
/// `Arc<dyn ProviderAdapter>`. Implementations must auto-initialize when a
/// generation call arrives before [`initialize`](Self::initialize).
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Returns the registry identifier of this backend.
    fn kind(&self) -> ProviderKind;

    /// Returns the immutable configuration this instance was built with.
    fn config(&self) -> &ProviderConfig;

    /// Performs one-time setup such as credential checks and client
    /// construction. Calling it again is harmless.
    async fn initialize(&self) -> Result<(), TandemError>;

    /// One-shot completion. A present `system` instruction must reach the
    /// model; how it is joined with `prompt` is backend-defined.
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        options: &ProviderOptions,
    ) -> Result<ProviderResponse, TandemError>;

    /// Streaming completion. The concatenated fragments equal what
    /// [`generate`](Self::generate) returns for the same inputs.
    async fn generate_stream(
        &self,
        prompt: &str,
        system: Option<&str>,
        options: &ProviderOptions,
    ) -> Result<TextStream, TandemError>;

    /// Multi-turn exchange. The last message must come from the user;
    /// leading system messages are folded into the first user turn.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ProviderOptions,
    ) -> Result<ProviderResponse, TandemError>;

    /// Releases held resources. Safe to call repeatedly or before
    /// initialization.
    async fn close(&self) -> Result<(), TandemError>;
}
