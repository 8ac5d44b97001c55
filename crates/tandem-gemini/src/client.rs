// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini Generative Language API.
//!
//! Provides [`GeminiClient`] which handles request construction,
//! authentication, and error classification. Nothing here retries; failures
//! carry a `retryable` flag for the caller.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tandem_core::TandemError;
use tracing::debug;

use crate::sse::{self, ChunkStream};
use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Base URL for the Gemini v1beta REST API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client bound to one model and credential.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client. Fails without network I/O on an empty or
    /// non-header-safe API key.
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Result<Self, TandemError> {
        if api_key.trim().is_empty() {
            return Err(TandemError::provider("Gemini API key is missing"));
        }

        let mut key = HeaderValue::from_str(api_key).map_err(|e| TandemError::Provider {
            message: format!("invalid API key header value: {e}"),
            retryable: false,
            source: Some(Box::new(e)),
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| TandemError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                retryable: false,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: model.trim_start_matches("models/").to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{method}", self.base_url, self.model)
    }

    /// Sends a non-streaming request. Returns the typed body and the raw JSON.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<(GenerateContentResponse, serde_json::Value), TandemError> {
        let response = self
            .client
            .post(self.endpoint("generateContent"))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("HTTP request failed", e))?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error("failed to read response body", e))?;
        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| TandemError::Provider {
                message: format!("failed to parse API response: {e}"),
                retryable: false,
                source: Some(Box::new(e)),
            })?;
        let parsed: GenerateContentResponse =
            serde_json::from_value(raw.clone()).map_err(|e| TandemError::Provider {
                message: format!("unexpected API response shape: {e}"),
                retryable: false,
                source: Some(Box::new(e)),
            })?;
        Ok((parsed, raw))
    }

    /// Sends a streaming request and returns the parsed SSE chunks.
    pub async fn stream_generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream, TandemError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("HTTP request failed", e))?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "streamGenerateContent response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        Ok(sse::parse_sse_stream(response))
    }
}

/// Returns true for HTTP statuses that indicate a transient failure.
pub fn is_retryable_status(status: StatusCode) -> bool {
    is_retryable_code(status.as_u16())
}

pub(crate) fn is_retryable_code(code: u16) -> bool {
    matches!(code, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Maps a reqwest failure; connect and timeout failures are transient.
pub(crate) fn transport_error(context: &str, e: reqwest::Error) -> TandemError {
    TandemError::Provider {
        message: format!("{context}: {e}"),
        retryable: e.is_connect() || e.is_timeout(),
        source: Some(Box::new(e)),
    }
}

/// Maps a non-2xx response, preferring the API's own error message.
pub(crate) fn status_error(status: StatusCode, body: &str) -> TandemError {
    let detail = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.describe())
        .unwrap_or_else(|_| body.to_string());
    TandemError::Provider {
        message: format!("Gemini API returned {status}: {detail}"),
        retryable: is_retryable_status(status),
        source: None,
    }
}
