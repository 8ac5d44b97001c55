// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovered content items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tandem_core::ContentType;

/// A suggested piece of content, scored against the user's preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    /// Empty when the suggestion came without a link.
    pub url: String,
    pub content_type: ContentType,
    pub description: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Relevance in `[0, 1]`.
    #[serde(default)]
    pub score: f64,
    pub discovered_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ContentItem {
    /// An unscored article with the given title, stamped now.
    pub fn article(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: String::new(),
            content_type: ContentType::Article,
            description: None,
            source: None,
            tags: Vec::new(),
            score: 0.0,
            discovered_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_content_type_as_kebab_case_tag() {
        let mut item = ContentItem::article("Rust in production");
        item.content_type = ContentType::CodeRepo;
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["content_type"], "code-repo");
        assert_eq!(json["url"], "");
        assert!(json["discovered_at"].as_str().unwrap().contains('T'));
    }
}
