// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form JSON object attached to interactions and the scratch context.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single completed exchange between the user and the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// What the user said.
    pub user_input: String,
    /// What the agent answered.
    pub agent_output: String,
    /// When the exchange was recorded.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Interaction {
    /// Creates an interaction stamped with the current time.
    pub fn new(
        user_input: impl Into<String>,
        agent_output: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            agent_output: agent_output.into(),
            timestamp: Utc::now(),
            metadata,
        }
    }

    /// Case-insensitive containment check against input and output.
    pub(crate) fn matches(&self, needle_lower: &str) -> bool {
        self.user_input.to_lowercase().contains(needle_lower)
            || self.agent_output.to_lowercase().contains(needle_lower)
    }
}

/// The persisted shape of the memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub context: Metadata,
}

/// Statistics describing what the memory currently retains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub total_interactions: usize,
    pub context_keys: Vec<String>,
    pub oldest_interaction: Option<DateTime<Utc>>,
    pub newest_interaction: Option<DateTime<Utc>>,
}
