// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for `streamGenerateContent?alt=sse` responses.
//!
//! Each event's `data` is a full [`GenerateContentResponse`] carrying the
//! next text fragment. Events are unnamed, so there is no type dispatch.

use std::pin::Pin;

use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::{Stream, StreamExt};
use tandem_core::TandemError;

use crate::client::{is_retryable_code, transport_error};
use crate::types::{ApiErrorBody, GenerateContentResponse};

/// Parsed chunks of a streaming response.
pub type ChunkStream =
    Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, TandemError>> + Send>>;

/// Parses a reqwest streaming response into typed chunks.
///
/// Empty keep-alive events are skipped. An `error` object inside the stream
/// becomes a provider error.
pub fn parse_sse_stream(response: reqwest::Response) -> ChunkStream {
    let events = response.bytes_stream().eventsource();

    let mapped = events.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = event.data.trim();
                if data.is_empty() {
                    return None;
                }
                Some(parse_chunk(data))
            }
            Err(EventStreamError::Transport(e)) => {
                Some(Err(transport_error("SSE stream interrupted", e)))
            }
            Err(e) => Some(Err(TandemError::provider(format!("SSE stream error: {e}")))),
        }
    });

    Box::pin(mapped)
}

fn parse_chunk(data: &str) -> Result<GenerateContentResponse, TandemError> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| TandemError::Provider {
        message: format!("failed to parse stream chunk: {e}"),
        retryable: false,
        source: Some(Box::new(e)),
    })?;

    if let Some(error) = value.get("error") {
        let body: ApiErrorBody = serde_json::from_value(error.clone()).unwrap_or(ApiErrorBody {
            code: None,
            message: Some(error.to_string()),
            status: None,
        });
        return Err(TandemError::Provider {
            message: format!("Gemini stream error: {}", body.describe()),
            retryable: body.code.is_some_and(is_retryable_code),
            source: None,
        });
    }

    serde_json::from_value(value).map_err(|e| TandemError::Provider {
        message: format!("unexpected stream chunk shape: {e}"),
        retryable: false,
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves `sse_text` from wiremock to get a real reqwest::Response.
    async fn mock_sse_response(sse_text: &str) -> reqwest::Response {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_text.to_string()),
            )
            .mount(&server)
            .await;

        reqwest::get(&server.uri()).await.unwrap()
    }

    fn chunk(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"role\":\"model\",\"parts\":[{{\"text\":\"{text}\"}}]}}}}]}}\n\n"
        )
    }

    #[tokio::test]
    async fn parses_chunks_in_order() {
        let sse = format!("{}{}", chunk("Hel"), chunk("lo"));
        let response = mock_sse_response(&sse).await;
        let chunks: Vec<_> = parse_sse_stream(response).collect().await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().text(), "Hel");
        assert_eq!(chunks[1].as_ref().unwrap().text(), "lo");
    }

    #[tokio::test]
    async fn final_chunk_carries_finish_reason_and_usage() {
        let sse = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"!\"}]},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"promptTokenCount\":1,\"candidatesTokenCount\":1,\"totalTokenCount\":2}}\n\n";
        let response = mock_sse_response(sse).await;
        let mut stream = parse_sse_stream(response);

        let last = stream.next().await.unwrap().unwrap();
        assert_eq!(last.finish_reason(), Some("STOP"));
        assert_eq!(last.usage().unwrap().total_tokens, 2);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn in_stream_error_becomes_provider_error() {
        let sse = "data: {\"error\":{\"code\":503,\"message\":\"overloaded\",\"status\":\"UNAVAILABLE\"}}\n\n";
        let response = mock_sse_response(sse).await;
        let mut stream = parse_sse_stream(response);

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("UNAVAILABLE: overloaded"), "got: {err}");
    }

    #[tokio::test]
    async fn malformed_chunk_is_fatal() {
        let response = mock_sse_response("data: {oops\n\n").await;
        let mut stream = parse_sse_stream(response);

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_provider());
        assert!(!err.is_retryable());
    }
}
