// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tandem assistant.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across provider adapters, stores, and sessions.
#[derive(Debug, Error)]
pub enum TandemError {
    /// Configuration errors (invalid values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM provider errors (transport, authentication, quota, malformed reply).
    ///
    /// `retryable` separates transient failures from fatal ones. Nothing in
    /// the workspace retries automatically; the caller decides.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        retryable: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The registry has no constructor for the requested provider.
    #[error("unsupported provider `{requested}` (registered: {})", format_registered(registered))]
    UnsupportedProvider {
        requested: String,
        registered: Vec<String>,
    },

    /// Reading or writing a persisted store failed.
    #[error("persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A known preference field was given a value of the wrong shape.
    #[error("invalid value for preference `{key}`: {reason}")]
    InvalidPreference { key: String, reason: String },

    /// A user id that cannot be used as a storage key.
    #[error("invalid user id `{0}`")]
    InvalidUserId(String),

    /// The session was closed and accepts no further operations.
    #[error("session is closed")]
    SessionClosed,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TandemError {
    /// A fatal provider error with no underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        TandemError::Provider {
            message: message.into(),
            retryable: false,
            source: None,
        }
    }

    /// A transient provider error with no underlying source.
    pub fn provider_retryable(message: impl Into<String>) -> Self {
        TandemError::Provider {
            message: message.into(),
            retryable: true,
            source: None,
        }
    }

    /// Wraps an I/O or decode failure for `path`.
    pub fn persistence(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TandemError::Persistence {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Returns true only for provider errors flagged as transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TandemError::Provider { retryable: true, .. })
    }

    /// Returns true for any provider error, retryable or not.
    pub fn is_provider(&self) -> bool {
        matches!(self, TandemError::Provider { .. })
    }
}

fn format_registered(registered: &[String]) -> String {
    if registered.is_empty() {
        "none".to_string()
    } else {
        registered.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_flag_only_on_transient_provider_errors() {
        assert!(TandemError::provider_retryable("429").is_retryable());
        assert!(!TandemError::provider("401").is_retryable());
        assert!(!TandemError::Internal("x".into()).is_retryable());
        assert!(TandemError::provider("401").is_provider());
    }

    #[test]
    fn unsupported_provider_names_requested_and_registered() {
        let err = TandemError::UnsupportedProvider {
            requested: "openai".into(),
            registered: vec!["gemini".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("openai"), "got: {msg}");
        assert!(msg.contains("gemini"), "got: {msg}");

        let empty = TandemError::UnsupportedProvider {
            requested: "openai".into(),
            registered: vec![],
        };
        assert!(empty.to_string().contains("none"));
    }

    #[test]
    fn persistence_error_includes_path() {
        let err = TandemError::persistence("/tmp/x.json", std::io::Error::other("disk full"));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/x.json"));
        assert!(msg.contains("disk full"));
    }
}
