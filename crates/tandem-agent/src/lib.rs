// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session orchestration for the Tandem assistant.
//!
//! An [`AgentSession`] owns one user's profile and interaction memory and
//! drives the provider for chat, content discovery, and reflection.

pub mod content;
pub mod discovery;
pub mod prompt;
pub mod session;

pub use content::ContentItem;
pub use discovery::{parse_suggestions, rank};
pub use session::{
    AgentSession, AgentStatus, FALLBACK_REPLY, NOT_ENOUGH_HISTORY, SessionOptions, SessionState,
    UNABLE_TO_ANALYZE,
};
