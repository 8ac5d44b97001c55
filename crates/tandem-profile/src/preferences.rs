// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-discovery preferences and keyed updates.

use std::collections::HashSet;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tandem_core::{ContentType, TandemError};

/// Free-form JSON object used for settings maps.
pub type Settings = serde_json::Map<String, Value>;

/// What the user wants surfaced, and what to keep out.
///
/// List fields behave as ordered sets, including when read from disk.
/// Every field defaults independently so that files written by older
/// versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    #[serde(deserialize_with = "deserialize_set")]
    pub interests: Vec<String>,
    #[serde(deserialize_with = "deserialize_set")]
    pub topics: Vec<String>,
    #[serde(deserialize_with = "deserialize_set")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "deserialize_set")]
    pub content_types: Vec<ContentType>,
    #[serde(deserialize_with = "deserialize_set")]
    pub excluded_keywords: Vec<String>,
    pub time_of_day_preferences: Settings,
    pub custom_settings: Settings,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            topics: Vec::new(),
            languages: vec!["en".to_string()],
            content_types: vec![ContentType::Article, ContentType::Video, ContentType::Paper],
            excluded_keywords: Vec::new(),
            time_of_day_preferences: Settings::new(),
            custom_settings: Settings::new(),
        }
    }
}

impl UserPreferences {
    /// Overwrites the field named `key`, or stores `value` under
    /// `custom_settings[key]` when no such field exists.
    ///
    /// Decoding happens before any write, so a rejected value leaves the
    /// preferences untouched.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), TandemError> {
        match key {
            "interests" => self.interests = decode_set(key, value)?,
            "topics" => self.topics = decode_set(key, value)?,
            "languages" => self.languages = decode_set(key, value)?,
            "content_types" => self.content_types = decode_set(key, value)?,
            "excluded_keywords" => self.excluded_keywords = decode_set(key, value)?,
            "time_of_day_preferences" => self.time_of_day_preferences = decode(key, value)?,
            "custom_settings" => self.custom_settings = decode(key, value)?,
            _ => {
                self.custom_settings.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, TandemError> {
    serde_json::from_value(value).map_err(|e| TandemError::InvalidPreference {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn decode_set<T>(key: &str, value: Value) -> Result<Vec<T>, TandemError>
where
    T: DeserializeOwned + Eq + Hash + Clone,
{
    let items: Vec<T> = decode(key, value)?;
    Ok(dedup_in_order(items))
}

fn deserialize_set<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Eq + Hash + Clone,
{
    Vec::<T>::deserialize(deserializer).map(dedup_in_order)
}

/// Drops repeated entries, keeping the first occurrence of each.
pub(crate) fn dedup_in_order<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
