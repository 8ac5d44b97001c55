// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content discovery: prompt construction, free-text parsing, and ranking.
//!
//! The model is asked for a numbered list. [`parse_suggestions`] turns that
//! list into [`ContentItem`]s and [`rank`] scores them against the user's
//! interests and topics.

use crate::content::ContentItem;

/// System instruction sent with every discovery request.
pub const DISCOVERY_SYSTEM: &str = "You are a content curator helping find interesting material.";

const BASE_SCORE: f64 = 0.5;
const INTEREST_BONUS: f64 = 0.3;
const TOPIC_BONUS: f64 = 0.2;

/// Builds the discovery request for `limit` suggestions.
pub fn discovery_prompt(
    limit: usize,
    interests: &[String],
    topics: &[String],
    excluded: &[String],
) -> String {
    let mut prompt = format!(
        "Based on the following user interests and topics, suggest {limit} interesting \
         content items (articles, videos, papers) that would be valuable.\n\n\
         Interests: {}\n\
         Topics: {}\n",
        interests.join(", "),
        topics.join(", "),
    );
    if !excluded.is_empty() {
        prompt.push_str(&format!("Avoid content about: {}\n", excluded.join(", ")));
    }
    prompt.push_str(
        "\nFor each suggestion, provide:\n\
         1. Title\n\
         2. Brief description\n\
         3. Why it would be interesting to this user\n\n\
         Format as a numbered list.",
    );
    prompt
}

/// Parses a numbered list into content items.
///
/// A line made of ASCII digits followed by `.` opens an item whose title is
/// the rest of the line. Following non-empty lines become its description.
/// Anything before the first numbered line is dropped, as are items whose
/// title is empty.
pub fn parse_suggestions(text: &str) -> Vec<ContentItem> {
    let mut items = Vec::new();
    let mut title: Option<String> = None;
    let mut description: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match numbered_title(line) {
            Some(next) => {
                push_item(&mut items, title.take(), &mut description);
                title = Some(next.to_string());
            }
            None if title.is_some() => description.push(line),
            None => {}
        }
    }
    push_item(&mut items, title, &mut description);

    items
}

fn numbered_title(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.').map(str::trim)
}

fn push_item(items: &mut Vec<ContentItem>, title: Option<String>, description: &mut Vec<&str>) {
    let lines = std::mem::take(description);
    let Some(title) = title.filter(|t| !t.is_empty()) else {
        return;
    };
    let mut item = ContentItem::article(title);
    if !lines.is_empty() {
        item.description = Some(lines.join("\n"));
    }
    items.push(item);
}

/// Scores `items` against the user's interests and topics and sorts them,
/// best first. Equal scores keep their incoming order.
pub fn rank(mut items: Vec<ContentItem>, interests: &[String], topics: &[String]) -> Vec<ContentItem> {
    for item in &mut items {
        let mut score = BASE_SCORE;
        if intersects(&item.tags, interests) {
            score += INTEREST_BONUS;
        }
        if intersects(&item.tags, topics) {
            score += TOPIC_BONUS;
        }
        item.score = score.min(1.0);
    }
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
    items
}

fn intersects(tags: &[String], wanted: &[String]) -> bool {
    tags.iter().any(|tag| wanted.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parses_numbered_list_with_descriptions() {
        let text = "Here are some ideas:\n\n\
                    1. The Rust Book\n   Official guide.\n   Great for beginners.\n\
                    2. Tokio internals\n\n\
                    10. Async in depth\nDeep dive.";
        let items = parse_suggestions(text);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "The Rust Book");
        assert_eq!(
            items[0].description.as_deref(),
            Some("Official guide.\nGreat for beginners.")
        );
        assert_eq!(items[1].title, "Tokio internals");
        assert_eq!(items[1].description, None);
        assert_eq!(items[2].title, "Async in depth");
        assert!(items.iter().all(|i| i.url.is_empty()));
    }

    #[test]
    fn preamble_and_unnumbered_text_is_discarded() {
        assert!(parse_suggestions("No list here.\n- bullet\n").is_empty());
        assert!(parse_suggestions("").is_empty());
    }

    #[test]
    fn digits_without_period_do_not_open_an_item() {
        let items = parse_suggestions("1. First\n2024 was a big year\n");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description.as_deref(), Some("2024 was a big year"));
    }

    #[test]
    fn empty_titles_are_skipped() {
        let items = parse_suggestions("1.\norphan line\n2. Kept");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Kept");
    }

    #[test]
    fn rank_scores_tag_matches() {
        let interests = strings(&["AI"]);
        let topics = strings(&["Python"]);
        let items = vec![
            ContentItem::article("plain"),
            ContentItem::article("python").with_tags(["Python"]),
            ContentItem::article("ai").with_tags(["AI"]),
        ];

        let ranked = rank(items, &interests, &topics);
        let titles: Vec<&str> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["ai", "python", "plain"]);
        assert!(approx(ranked[0].score, 0.8));
        assert!(approx(ranked[1].score, 0.7));
        assert!(approx(ranked[2].score, 0.5));
    }

    #[test]
    fn rank_caps_at_one_and_is_stable() {
        let interests = strings(&["AI"]);
        let topics = strings(&["AI"]);
        let items = vec![
            ContentItem::article("first"),
            ContentItem::article("both").with_tags(["AI"]),
            ContentItem::article("second"),
        ];

        let ranked = rank(items, &interests, &topics);
        assert!(approx(ranked[0].score, 1.0));
        assert_eq!(ranked[1].title, "first");
        assert_eq!(ranked[2].title, "second");
    }

    #[test]
    fn prompt_mentions_limit_and_preferences() {
        let prompt = discovery_prompt(3, &strings(&["AI", "music"]), &strings(&["Rust"]), &[]);
        assert!(prompt.contains("suggest 3 interesting"));
        assert!(prompt.contains("Interests: AI, music"));
        assert!(prompt.contains("Topics: Rust"));
        assert!(prompt.ends_with("Format as a numbered list."));
        assert!(!prompt.contains("Avoid"));

        let prompt = discovery_prompt(1, &[], &[], &strings(&["crypto"]));
        assert!(prompt.contains("Avoid content about: crypto"));
    }
}
