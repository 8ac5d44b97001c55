// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tandem assistant.
//!
//! This crate provides the provider trait, the provider registry, the shared
//! error type, and the common types used throughout the workspace. Backends
//! implement [`ProviderAdapter`]; stores use the helpers in [`persist`].

pub mod chat;
pub mod error;
pub mod persist;
pub mod registry;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TandemError;
pub use registry::{ProviderFactory, ProviderRegistry};
pub use traits::ProviderAdapter;
pub use types::{
    ChatMessage, ContentType, ProviderConfig, ProviderKind, ProviderOptions, ProviderResponse,
    Role, TextStream, TokenUsage,
};
