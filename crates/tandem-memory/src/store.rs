// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, ordered interaction log with a key/value scratch context.

use std::collections::VecDeque;
use std::path::Path;

use serde::Serialize;
use tandem_core::persist::{read_json, write_json};
use tandem_core::{ChatMessage, TandemError};
use tracing::debug;

use crate::types::{Interaction, MemoryState, MemorySummary, Metadata};

/// Default number of interactions retained.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Returned by [`InteractionMemory::recent_text`] when nothing is recorded.
pub const NO_CONTEXT: &str = "No previous context.";

/// Conversation memory for one user session.
///
/// Keeps at most `max_history` interactions; recording past the bound
/// evicts the oldest entries first.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMemory {
    max_history: usize,
    interactions: VecDeque<Interaction>,
    context: Metadata,
}

/// Borrowed view serialized by [`InteractionMemory::save`].
#[derive(Serialize)]
struct StateRef<'a> {
    interactions: &'a VecDeque<Interaction>,
    context: &'a Metadata,
}

impl Default for InteractionMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl InteractionMemory {
    /// Creates an empty memory retaining at most `max_history` interactions.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            interactions: VecDeque::with_capacity(max_history.min(DEFAULT_MAX_HISTORY)),
            context: Metadata::new(),
        }
    }

    /// Builds a memory from persisted state, keeping the newest entries.
    pub fn from_state(max_history: usize, state: MemoryState) -> Self {
        let mut memory = Self::new(max_history);
        memory.replace_state(state);
        memory
    }

    /// Snapshot of the current state.
    pub fn to_state(&self) -> MemoryState {
        MemoryState {
            interactions: self.interactions.iter().cloned().collect(),
            context: self.context.clone(),
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Retained interactions, oldest first.
    pub fn interactions(&self) -> impl DoubleEndedIterator<Item = &Interaction> + ExactSizeIterator {
        self.interactions.iter()
    }

    /// Appends an exchange stamped now and evicts from the front past the bound.
    ///
    /// Returns the stored interaction, or `None` when `max_history` is 0 and
    /// nothing is retained.
    pub fn record(
        &mut self,
        user_input: impl Into<String>,
        agent_output: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Option<&Interaction> {
        self.interactions.push_back(Interaction::new(
            user_input,
            agent_output,
            metadata.unwrap_or_default(),
        ));
        self.enforce_bound();
        self.interactions.back()
    }

    /// The last `n` interactions (fewer if not available), oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Interaction> {
        self.interactions
            .iter()
            .skip(self.interactions.len().saturating_sub(n))
    }

    /// Renders the last `n` interactions as a numbered transcript.
    pub fn recent_text(&self, n: usize) -> String {
        let mut lines = Vec::new();
        for (i, interaction) in self.recent(n).enumerate() {
            lines.push(format!("\n{}. User: {}", i + 1, interaction.user_input));
            lines.push(format!("   Agent: {}", interaction.agent_output));
        }
        if lines.is_empty() {
            return NO_CONTEXT.to_string();
        }
        lines.insert(0, "Recent conversation:".to_string());
        lines.join("\n")
    }

    /// Renders the last `n` interactions as chat turns, two per interaction.
    pub fn recent_as_turns(&self, n: usize) -> Vec<ChatMessage> {
        self.recent(n)
            .flat_map(|interaction| {
                [
                    ChatMessage::user(interaction.user_input.clone()),
                    ChatMessage::assistant(interaction.agent_output.clone()),
                ]
            })
            .collect()
    }

    /// Case-insensitive substring search over inputs and outputs, in
    /// chronological order.
    pub fn search(&self, query: &str) -> Vec<&Interaction> {
        let needle = query.to_lowercase();
        self.interactions
            .iter()
            .filter(|interaction| interaction.matches(&needle))
            .collect()
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.context.insert(key.into(), value);
    }

    pub fn context(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }

    /// Drops every interaction; the scratch context is kept.
    pub fn clear_history(&mut self) {
        self.interactions.clear();
    }

    pub fn summary(&self) -> MemorySummary {
        MemorySummary {
            total_interactions: self.interactions.len(),
            context_keys: self.context.keys().cloned().collect(),
            oldest_interaction: self.interactions.front().map(|i| i.timestamp),
            newest_interaction: self.interactions.back().map(|i| i.timestamp),
        }
    }

    /// Writes interactions and context to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<(), TandemError> {
        write_json(
            path,
            &StateRef {
                interactions: &self.interactions,
                context: &self.context,
            },
        )?;
        debug!(path = %path.display(), count = self.interactions.len(), "memory saved");
        Ok(())
    }

    /// Replaces the in-memory state with the contents of `path`.
    ///
    /// A missing file leaves the current state untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), TandemError> {
        match read_json::<MemoryState>(path)? {
            Some(state) => {
                self.replace_state(state);
                debug!(path = %path.display(), count = self.interactions.len(), "memory loaded");
            }
            None => debug!(path = %path.display(), "no saved memory, keeping current state"),
        }
        Ok(())
    }

    fn replace_state(&mut self, state: MemoryState) {
        self.interactions = state.interactions.into();
        self.context = state.context;
        self.enforce_bound();
    }

    fn enforce_bound(&mut self) {
        while self.interactions.len() > self.max_history {
            self.interactions.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tandem_core::Role;

    use super::*;

    fn filled(n: usize, max: usize) -> InteractionMemory {
        let mut memory = InteractionMemory::new(max);
        for i in 0..n {
            memory.record(format!("q{i}"), format!("a{i}"), None);
        }
        memory
    }

    #[test]
    fn record_appends_in_order() {
        let memory = filled(3, 10);
        let inputs: Vec<_> = memory.interactions().map(|i| i.user_input.as_str()).collect();
        assert_eq!(inputs, vec!["q0", "q1", "q2"]);
    }

    #[test]
    fn record_evicts_oldest_past_bound() {
        let memory = filled(12, 10);
        assert_eq!(memory.len(), 10);
        assert_eq!(memory.interactions().next().unwrap().user_input, "q2");
        assert_eq!(memory.interactions().last().unwrap().user_input, "q11");
    }

    #[test]
    fn record_keeps_metadata() {
        let mut memory = InteractionMemory::default();
        let mut meta = Metadata::new();
        meta.insert("model".into(), serde_json::json!("gemini"));
        let stored = memory.record("hi", "hello", Some(meta.clone())).unwrap();
        assert_eq!(stored.metadata, meta);
        assert_eq!(memory.max_history(), DEFAULT_MAX_HISTORY);
    }

    #[test]
    fn zero_bound_retains_nothing() {
        let mut memory = InteractionMemory::new(0);
        assert!(memory.record("q", "a", None).is_none());
        assert!(memory.is_empty());
        assert_eq!(memory.recent_text(3), NO_CONTEXT);
    }

    #[test]
    fn recent_text_sentinel_when_empty() {
        assert_eq!(InteractionMemory::default().recent_text(5), NO_CONTEXT);
    }

    #[test]
    fn recent_text_numbers_last_n() {
        let memory = filled(4, 10);
        let text = memory.recent_text(2);
        assert!(text.starts_with("Recent conversation:"));
        assert!(text.contains("1. User: q2"));
        assert!(text.contains("   Agent: a2"));
        assert!(text.contains("2. User: q3"));
        assert!(!text.contains("q1"));
    }

    #[test]
    fn recent_text_clamps_to_available() {
        let memory = filled(2, 10);
        let text = memory.recent_text(10);
        assert!(text.contains("1. User: q0"));
        assert!(text.contains("2. User: q1"));
    }

    #[test]
    fn recent_as_turns_alternates_user_assistant() {
        let memory = filled(3, 10);
        let turns = memory.recent_as_turns(5);
        assert_eq!(turns.len(), 6);
        for (i, pair) in turns.chunks(2).enumerate() {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[0].content, format!("q{i}"));
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[1].content, format!("a{i}"));
        }
    }

    #[test]
    fn recent_as_turns_window() {
        let memory = filled(5, 10);
        let turns = memory.recent_as_turns(2);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].content, "q3");
        assert_eq!(turns[3].content, "a4");
        assert!(memory.recent_as_turns(0).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_and_chronological() {
        let mut memory = InteractionMemory::default();
        memory.record("Tell me about Rust", "It is a language", None);
        memory.record("weather?", "sunny", None);
        memory.record("more", "RUST has ownership", None);

        let hits = memory.search("rust");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].user_input, "Tell me about Rust");
        assert_eq!(hits[1].agent_output, "RUST has ownership");
        assert!(memory.search("python").is_empty());
    }

    #[test]
    fn summary_reports_bounds_and_context_keys() {
        let empty = InteractionMemory::default().summary();
        assert_eq!(empty.total_interactions, 0);
        assert!(empty.oldest_interaction.is_none());
        assert!(empty.newest_interaction.is_none());

        let mut memory = filled(3, 10);
        memory.set_context("mood", serde_json::json!("curious"));
        let summary = memory.summary();
        assert_eq!(summary.total_interactions, 3);
        assert_eq!(summary.context_keys, vec!["mood".to_string()]);
        let first = memory.interactions().next().unwrap().timestamp;
        let last = memory.interactions().last().unwrap().timestamp;
        assert_eq!(summary.oldest_interaction, Some(first));
        assert_eq!(summary.newest_interaction, Some(last));
    }

    #[test]
    fn context_get_set_and_clear_history() {
        let mut memory = filled(2, 10);
        memory.set_context("k", serde_json::json!(1));
        assert_eq!(memory.context("k"), Some(&serde_json::json!(1)));
        assert_eq!(memory.context("missing"), None);

        memory.clear_history();
        assert!(memory.is_empty());
        assert_eq!(memory.context("k"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory_test.json");

        let mut memory = filled(3, 10);
        memory.set_context("topic", serde_json::json!({"name": "rust"}));
        memory.save(&path).unwrap();

        let mut restored = InteractionMemory::new(10);
        restored.load(&path).unwrap();
        assert_eq!(restored, memory);
    }

    #[test]
    fn load_missing_path_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut memory = filled(3, 10);
        let before = memory.clone();

        memory.load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(memory, before);
    }

    #[test]
    fn load_truncates_to_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        filled(8, 10).save(&path).unwrap();

        let mut small = InteractionMemory::new(3);
        small.load(&path).unwrap();
        let inputs: Vec<_> = small.interactions().map(|i| i.user_input.as_str()).collect();
        assert_eq!(inputs, vec!["q5", "q6", "q7"]);
    }

    #[test]
    fn load_corrupt_file_errors_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "[]garbage").unwrap();

        let mut memory = filled(2, 10);
        let before = memory.clone();
        assert!(memory.load(&path).is_err());
        assert_eq!(memory, before);
    }

    #[test]
    fn state_snapshot_round_trip() {
        let memory = filled(4, 10);
        let rebuilt = InteractionMemory::from_state(10, memory.to_state());
        assert_eq!(rebuilt, memory);
    }

    proptest! {
        #[test]
        fn bound_keeps_most_recent_in_order(max in 1usize..20, n in 0usize..60) {
            let memory = filled(n, max);
            let expected: Vec<String> = (n.saturating_sub(max)..n).map(|i| format!("q{i}")).collect();
            let actual: Vec<String> = memory.interactions().map(|i| i.user_input.clone()).collect();
            prop_assert_eq!(memory.len(), n.min(max));
            prop_assert_eq!(actual, expected);
        }
    }
}
