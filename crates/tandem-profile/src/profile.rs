// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable per-user identity, preferences, and event history.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tandem_core::TandemError;
use tandem_core::persist::{read_json, write_json};
use tracing::debug;

use crate::preferences::{Settings, UserPreferences};

pub const DEFAULT_USER_ID: &str = "default";
pub const DEFAULT_USER_NAME: &str = "User";

/// One entry in the append-only profile event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEvent {
    /// Event tag such as `message` or `content_discovery`.
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Value,
    pub timestamp: DateTime<Utc>,
}

/// A user's profile.
///
/// `created_at` is fixed at construction. `updated_at` moves forward on
/// every effective mutation and never goes backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub interaction_history: Vec<ProfileEvent>,
    #[serde(default)]
    pub learned_patterns: Settings,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

fn default_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::create_default(None, None)
    }
}

impl UserProfile {
    /// Creates a profile with default preferences.
    ///
    /// Falls back to `"default"` and `"User"` for a missing id or name.
    pub fn create_default(user_id: Option<&str>, name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.unwrap_or(DEFAULT_USER_ID).to_string(),
            name: name.unwrap_or(DEFAULT_USER_NAME).to_string(),
            preferences: UserPreferences::default(),
            interaction_history: Vec::new(),
            learned_patterns: Settings::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn interests(&self) -> &[String] {
        &self.preferences.interests
    }

    pub fn topics(&self) -> &[String] {
        &self.preferences.topics
    }

    /// Adds `interest` if absent. Returns true when the set changed.
    pub fn add_interest(&mut self, interest: &str) -> bool {
        let changed = insert_unique(&mut self.preferences.interests, interest);
        self.touch_if(changed);
        changed
    }

    /// Removes `interest` if present. Returns true when the set changed.
    pub fn remove_interest(&mut self, interest: &str) -> bool {
        let changed = remove_value(&mut self.preferences.interests, interest);
        self.touch_if(changed);
        changed
    }

    /// Adds `topic` if absent. Returns true when the set changed.
    pub fn add_topic(&mut self, topic: &str) -> bool {
        let changed = insert_unique(&mut self.preferences.topics, topic);
        self.touch_if(changed);
        changed
    }

    /// Removes `topic` if present. Returns true when the set changed.
    pub fn remove_topic(&mut self, topic: &str) -> bool {
        let changed = remove_value(&mut self.preferences.topics, topic);
        self.touch_if(changed);
        changed
    }

    /// Appends an event stamped now.
    pub fn record_event(&mut self, kind: impl Into<String>, content: Value) {
        self.interaction_history.push(ProfileEvent {
            kind: kind.into(),
            content,
            timestamp: Utc::now(),
        });
        self.touch();
    }

    /// Sets a preference by field name; unknown names land in
    /// `custom_settings`.
    pub fn set_preference(&mut self, key: &str, value: Value) -> Result<(), TandemError> {
        self.preferences.set(key, value)?;
        self.touch();
        Ok(())
    }

    pub fn set_learned_pattern(&mut self, key: impl Into<String>, value: Value) {
        self.learned_patterns.insert(key.into(), value);
        self.touch();
    }

    pub fn learned_pattern(&self, key: &str) -> Option<&Value> {
        self.learned_patterns.get(key)
    }

    /// Writes the full profile to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<(), TandemError> {
        write_json(path, self)?;
        debug!(path = %path.display(), user_id = %self.user_id, "profile saved");
        Ok(())
    }

    /// Reads a profile from `path`. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, TandemError> {
        Self::try_load(path)?.ok_or_else(|| {
            TandemError::persistence(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "profile file not found"),
            )
        })
    }

    /// Reads a profile from `path`, returning `None` if the file is missing.
    pub fn try_load(path: &Path) -> Result<Option<Self>, TandemError> {
        let profile = read_json::<Self>(path)?;
        if let Some(profile) = &profile {
            debug!(path = %path.display(), user_id = %profile.user_id, "profile loaded");
        }
        Ok(profile)
    }

    fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }

    fn touch_if(&mut self, changed: bool) {
        if changed {
            self.touch();
        }
    }
}

fn insert_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_value(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != value);
    list.len() != before
}
