// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared chat-turn normalization used by provider adapters.

use crate::error::TandemError;
use crate::types::{ChatMessage, Role};

/// Separator placed between a system instruction and the text it precedes.
pub const SYSTEM_JOIN: &str = "\n\n";

/// Prepends `system` to `prompt` for backends without a native system slot.
pub fn join_system_prompt(system: Option<&str>, prompt: &str) -> String {
    match system {
        Some(system) if !system.trim().is_empty() => format!("{system}{SYSTEM_JOIN}{prompt}"),
        _ => prompt.to_string(),
    }
}

/// Normalizes a chat transcript into alternating user/assistant turns.
///
/// - Leading system messages are joined and prepended to the first user turn.
/// - System messages after the first non-system turn are rejected.
/// - The transcript must be non-empty and end with a user turn.
///
/// Returned messages only carry [`Role::User`] or [`Role::Assistant`].
pub fn normalize_chat(messages: &[ChatMessage]) -> Result<Vec<ChatMessage>, TandemError> {
    let leading = messages
        .iter()
        .take_while(|m| m.role == Role::System)
        .count();
    let (system_turns, rest) = messages.split_at(leading);

    if rest.is_empty() {
        return Err(TandemError::provider(
            "chat requires at least one user message",
        ));
    }
    if rest.iter().any(|m| m.role == Role::System) {
        return Err(TandemError::provider(
            "system messages are only accepted at the start of a chat",
        ));
    }
    if rest.last().map(|m| m.role) != Some(Role::User) {
        return Err(TandemError::provider(
            "the last chat message must come from the user",
        ));
    }

    let mut turns: Vec<ChatMessage> = rest.to_vec();
    if !system_turns.is_empty() {
        let system = system_turns
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(SYSTEM_JOIN);
        // The last turn is a user turn, so this always finds one.
        if let Some(first_user) = turns.iter_mut().find(|m| m.role == Role::User) {
            first_user.content = join_system_prompt(Some(&system), &first_user.content);
        }
    }

    Ok(turns)
}
