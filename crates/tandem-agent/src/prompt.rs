// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for chat and reflection.

use tandem_memory::Interaction;
use tandem_profile::UserProfile;

/// System instruction sent with every reflection request.
pub const REFLECTION_SYSTEM: &str =
    "You are an AI analyzing user behavior to provide better personalized assistance.";

const NOT_SPECIFIED: &str = "not specified";

/// Builds the chat system instruction from the user's profile.
pub fn system_prompt(profile: &UserProfile) -> String {
    let name = &profile.name;
    let interests = join_or_unspecified(profile.interests());
    let topics = join_or_unspecified(profile.topics());

    format!(
        "You are {name}'s personal AI assistant and co-pilot.\n\n\
         Your role is to:\n\
         - Help them understand and solve problems\n\
         - Discover interesting content related to their interests\n\
         - Learn their preferences and adapt to their needs\n\
         - Be proactive in suggesting relevant information\n\n\
         User profile:\n\
         - Name: {name}\n\
         - Interests: {interests}\n\
         - Topics: {topics}\n\n\
         Be conversational, helpful, and personalized in your responses."
    )
}

/// Builds the reflection request over `interactions`, oldest first.
pub fn reflection_prompt<'a>(
    interactions: impl IntoIterator<Item = &'a Interaction>,
    profile: &UserProfile,
) -> String {
    let transcript = interactions
        .into_iter()
        .map(|i| format!("User: {}\nAgent: {}", i.user_input, i.agent_output))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these recent interactions with the user and provide insights:\n\n\
         {transcript}\n\n\
         Current interests: {}\n\
         Current topics: {}\n\n\
         Provide:\n\
         1. What the user seems interested in\n\
         2. Patterns in their questions/interactions\n\
         3. Suggested interests to add\n\
         4. How to better assist them\n",
        profile.interests().join(", "),
        profile.topics().join(", "),
    )
}

fn join_or_unspecified(values: &[String]) -> String {
    if values.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        values.join(", ")
    }
}
