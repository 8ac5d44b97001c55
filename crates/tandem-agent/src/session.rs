// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user session that ties the provider, memory, and profile together.
//!
//! A session goes through two states: Active -> Closed. Every operation runs
//! on `&mut self`, so calls for one user are sequential by construction.
//! Provider failures never escape a session operation; they are logged and
//! replaced with a fixed fallback value. Persistence failures do escape.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tandem_core::persist::validate_user_id;
use tandem_core::{ChatMessage, ProviderAdapter, ProviderOptions, TandemError};
use tandem_memory::{InteractionMemory, MemorySummary, Metadata, DEFAULT_MAX_HISTORY};
use tandem_profile::UserProfile;
use tracing::{debug, error, info, warn};

use crate::content::ContentItem;
use crate::discovery::{self, DISCOVERY_SYSTEM};
use crate::prompt::{self, REFLECTION_SYSTEM};

/// Reply returned when the provider fails or is missing.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I encountered an error processing your message. Please try again.";

/// Reflection result when there is nothing to analyze yet.
pub const NOT_ENOUGH_HISTORY: &str = "Not enough interaction history to analyze yet.";

/// Reflection result when the provider fails or is missing.
pub const UNABLE_TO_ANALYZE: &str = "Unable to analyze user at this time.";

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum interactions retained in memory.
    pub max_history: usize,
    /// Interactions replayed as chat turns for each message.
    pub context_window: usize,
    /// Interactions summarized by a reflection pass.
    pub reflection_window: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            context_window: 5,
            reflection_window: 10,
        }
    }
}

/// States in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Active => write!(f, "active"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Snapshot of a session for status displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub name: String,
    pub interests: Vec<String>,
    pub topics: Vec<String>,
    pub memory: MemorySummary,
    pub discovered_content_count: usize,
}

/// One user's assistant session.
pub struct AgentSession {
    /// Fresh per open; ties log lines of one session together.
    session_id: String,
    state: SessionState,
    provider: Option<Arc<dyn ProviderAdapter>>,
    profile: UserProfile,
    memory: InteractionMemory,
    discovered: Vec<ContentItem>,
    data_dir: PathBuf,
    options: SessionOptions,
}

impl AgentSession {
    /// Opens a session for `profile.user_id`, restoring any saved state.
    ///
    /// A saved profile replaces `profile`. Corrupt files are logged and
    /// skipped, so only an unusable user id, a zero `max_history`, or an
    /// unusable data directory fails here.
    pub fn open(
        provider: Option<Arc<dyn ProviderAdapter>>,
        profile: UserProfile,
        data_dir: impl Into<PathBuf>,
        options: SessionOptions,
    ) -> Result<Self, TandemError> {
        validate_user_id(&profile.user_id)?;
        if options.max_history == 0 {
            return Err(TandemError::Config(
                "max_history must be at least 1".to_string(),
            ));
        }
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| TandemError::persistence(&data_dir, e))?;

        let mut session = Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            state: SessionState::Active,
            provider,
            profile,
            memory: InteractionMemory::new(options.max_history),
            discovered: Vec::new(),
            data_dir,
            options,
        };
        session.load_state();

        if session.provider.is_none() {
            warn!(user_id = %session.profile.user_id, "session opened without a provider; replies will use the fallback");
        }
        info!(
            session_id = %session.session_id,
            user_id = %session.profile.user_id,
            name = %session.profile.name,
            interactions = session.memory.len(),
            "session opened"
        );
        Ok(session)
    }

    fn load_state(&mut self) {
        let profile_path = self.profile_path();
        match UserProfile::try_load(&profile_path) {
            Ok(Some(profile)) if profile.user_id == self.profile.user_id => {
                self.profile = profile;
                debug!(path = %profile_path.display(), "loaded profile");
            }
            Ok(Some(profile)) => warn!(
                path = %profile_path.display(),
                expected = %self.profile.user_id,
                found = %profile.user_id,
                "saved profile belongs to another user; ignoring it"
            ),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to load profile; using defaults"),
        }

        let memory_path = self.memory_path();
        if let Err(e) = self.memory.load(&memory_path) {
            warn!(error = %e, "failed to load memory; starting empty");
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn user_id(&self) -> &str {
        &self.profile.user_id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn memory(&self) -> &InteractionMemory {
        &self.memory
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The provider backing this session, if any.
    pub fn provider(&self) -> Option<&Arc<dyn ProviderAdapter>> {
        self.provider.as_ref()
    }

    /// `profile_<user_id>.json` inside the data directory.
    pub fn profile_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("profile_{}.json", self.profile.user_id))
    }

    /// `memory_<user_id>.json` inside the data directory.
    pub fn memory_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("memory_{}.json", self.profile.user_id))
    }

    /// Writes both stores to disk.
    pub fn save(&self) -> Result<(), TandemError> {
        self.profile.save(&self.profile_path())?;
        self.memory.save(&self.memory_path())?;
        debug!(user_id = %self.profile.user_id, "session state saved");
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), TandemError> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Closed => Err(TandemError::SessionClosed),
        }
    }

    /// Answers one user message.
    ///
    /// The reply is recorded in memory and on the profile, then both are
    /// saved. A failing or missing provider yields [`FALLBACK_REPLY`].
    pub async fn handle_message(&mut self, text: &str) -> Result<String, TandemError> {
        self.ensure_active()?;
        debug!(user_id = %self.profile.user_id, chars = text.len(), "handling message");

        let mut messages = vec![ChatMessage::system(prompt::system_prompt(&self.profile))];
        messages.extend(self.memory.recent_as_turns(self.options.context_window));
        messages.push(ChatMessage::user(text));

        let result = match &self.provider {
            Some(provider) => provider.chat(&messages, &ProviderOptions::new()).await,
            None => Err(TandemError::provider("no provider configured")),
        };

        match result {
            Ok(response) => {
                let mut metadata = Metadata::new();
                metadata.insert("model".into(), json!(response.model));
                metadata.insert("finish_reason".into(), json!(response.finish_reason));
                self.memory
                    .record(text, response.content.clone(), Some(metadata));
                self.profile.record_event(
                    "message",
                    json!({ "input": text, "output": response.content }),
                );
                self.save()?;
                Ok(response.content)
            }
            Err(e) => {
                error!(
                    user_id = %self.profile.user_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "chat failed; replying with fallback"
                );
                self.memory.record(text, FALLBACK_REPLY, None);
                self.save()?;
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }

    /// Asks the provider for up to `limit` content suggestions and ranks
    /// them against the profile.
    ///
    /// Returns an empty list when the provider fails or is missing; nothing
    /// is recorded in that case.
    pub async fn discover(&mut self, limit: usize) -> Result<Vec<ContentItem>, TandemError> {
        self.ensure_active()?;
        let Some(provider) = &self.provider else {
            warn!(user_id = %self.profile.user_id, "discovery skipped: no provider configured");
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let preferences = &self.profile.preferences;
        let request = discovery::discovery_prompt(
            limit,
            &preferences.interests,
            &preferences.topics,
            &preferences.excluded_keywords,
        );
        let response = match provider
            .generate(&request, Some(DISCOVERY_SYSTEM), &ProviderOptions::new())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(
                    user_id = %self.profile.user_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "content discovery failed"
                );
                return Ok(Vec::new());
            }
        };

        let mut items = discovery::parse_suggestions(&response.content);
        items.truncate(limit);
        let batch_time = chrono::Utc::now();
        for item in &mut items {
            item.discovered_at = batch_time;
        }
        let items = discovery::rank(items, self.profile.interests(), self.profile.topics());

        self.discovered.extend(items.iter().cloned());
        self.profile.record_event(
            "content_discovery",
            json!({
                "count": items.len(),
                "top_item": items.first().map(|item| item.title.as_str()),
            }),
        );
        self.save()?;

        info!(user_id = %self.profile.user_id, count = items.len(), "content discovered");
        Ok(items)
    }

    /// Asks the provider for insight into the user's recent interactions.
    ///
    /// Records and persists nothing.
    pub async fn reflect(&mut self) -> Result<String, TandemError> {
        self.ensure_active()?;
        if self.memory.is_empty() {
            return Ok(NOT_ENOUGH_HISTORY.to_string());
        }
        let Some(provider) = &self.provider else {
            warn!(user_id = %self.profile.user_id, "reflection skipped: no provider configured");
            return Ok(UNABLE_TO_ANALYZE.to_string());
        };

        let request = prompt::reflection_prompt(
            self.memory.recent(self.options.reflection_window),
            &self.profile,
        );
        match provider
            .generate(&request, Some(REFLECTION_SYSTEM), &ProviderOptions::new())
            .await
        {
            Ok(response) => Ok(response.content),
            Err(e) => {
                error!(
                    user_id = %self.profile.user_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "reflection failed"
                );
                Ok(UNABLE_TO_ANALYZE.to_string())
            }
        }
    }

    /// Adds an interest and saves. Returns whether the set changed.
    pub fn add_interest(&mut self, interest: &str) -> Result<bool, TandemError> {
        self.update_profile(|p| p.add_interest(interest), "interest added", interest)
    }

    /// Removes an interest and saves. Returns whether the set changed.
    pub fn remove_interest(&mut self, interest: &str) -> Result<bool, TandemError> {
        self.update_profile(|p| p.remove_interest(interest), "interest removed", interest)
    }

    /// Adds a topic and saves. Returns whether the set changed.
    pub fn add_topic(&mut self, topic: &str) -> Result<bool, TandemError> {
        self.update_profile(|p| p.add_topic(topic), "topic added", topic)
    }

    /// Removes a topic and saves. Returns whether the set changed.
    pub fn remove_topic(&mut self, topic: &str) -> Result<bool, TandemError> {
        self.update_profile(|p| p.remove_topic(topic), "topic removed", topic)
    }

    fn update_profile(
        &mut self,
        mutate: impl FnOnce(&mut UserProfile) -> bool,
        action: &str,
        value: &str,
    ) -> Result<bool, TandemError> {
        self.ensure_active()?;
        let changed = mutate(&mut self.profile);
        self.save()?;
        if changed {
            info!(user_id = %self.profile.user_id, value, "{action}");
        }
        Ok(changed)
    }

    pub fn get_status(&self) -> AgentStatus {
        AgentStatus {
            name: self.profile.name.clone(),
            interests: self.profile.interests().to_vec(),
            topics: self.profile.topics().to_vec(),
            memory: self.memory.summary(),
            discovered_content_count: self.discovered.len(),
        }
    }

    /// The most recently discovered items, newest batch first. Items from
    /// one discovery pass keep their ranked order.
    pub fn recent_discoveries(&self, limit: usize) -> Vec<&ContentItem> {
        let mut items: Vec<&ContentItem> = self.discovered.iter().collect();
        items.sort_by(|a, b| b.discovered_at.cmp(&a.discovered_at));
        items.truncate(limit);
        items
    }

    /// Saves state and shuts the provider down. A second call does nothing.
    ///
    /// The session is closed even when the final save fails; the save error
    /// is still returned.
    pub async fn close(&mut self) -> Result<(), TandemError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;

        let saved = self.save();
        if let Some(provider) = &self.provider {
            if let Err(e) = provider.close().await {
                warn!(error = %e, "provider close failed");
            }
        }
        info!(
            session_id = %self.session_id,
            user_id = %self.profile.user_id,
            "session closed"
        );
        saved
    }
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("user_id", &self.profile.user_id)
            .field("provider", &self.provider.as_ref().map(|p| p.kind()))
            .field("interactions", &self.memory.len())
            .field("data_dir", &self.data_dir)
            .finish()
    }
}
