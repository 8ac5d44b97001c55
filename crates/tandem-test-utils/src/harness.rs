// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end session testing.
//!
//! `TestHarness` opens an [`AgentSession`] over a temp data directory with a
//! [`MockProvider`] behind it, and can reopen the session to check what was
//! persisted.

use std::path::Path;
use std::sync::Arc;

use tandem_agent::{AgentSession, SessionOptions};
use tandem_core::{ProviderAdapter, TandemError};
use tandem_profile::UserProfile;

use crate::mock_provider::MockProvider;

/// User id used by harness sessions unless overridden.
pub const TEST_USER_ID: &str = "test-user";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    user_id: String,
    user_name: String,
    interests: Vec<String>,
    topics: Vec<String>,
    options: SessionOptions,
    with_provider: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            user_id: TEST_USER_ID.to_string(),
            user_name: "Tester".to_string(),
            interests: Vec::new(),
            topics: Vec::new(),
            options: SessionOptions::default(),
            with_provider: true,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_user(mut self, user_id: &str, name: &str) -> Self {
        self.user_id = user_id.to_string();
        self.user_name = name.to_string();
        self
    }

    /// Seed the profile's interests.
    pub fn with_interests(mut self, interests: &[&str]) -> Self {
        self.interests = interests.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Seed the profile's topics.
    pub fn with_topics(mut self, topics: &[&str]) -> Self {
        self.topics = topics.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Open the session with no provider at all.
    pub fn without_provider(mut self) -> Self {
        self.with_provider = false;
        self
    }

    /// Build the harness, creating the temp directory and opening the session.
    pub fn build(self) -> Result<TestHarness, TandemError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| TandemError::persistence("<tempdir>", e))?;

        let mock_provider = Arc::new(MockProvider::with_responses(self.responses));

        let mut profile = UserProfile::create_default(Some(&self.user_id), Some(&self.user_name));
        for interest in &self.interests {
            profile.add_interest(interest);
        }
        for topic in &self.topics {
            profile.add_topic(topic);
        }

        let provider = self
            .with_provider
            .then(|| mock_provider.clone() as Arc<dyn ProviderAdapter>);
        let session = AgentSession::open(provider.clone(), profile, temp_dir.path(), self.options)?;

        Ok(TestHarness {
            mock_provider,
            session,
            provider,
            options: self.options,
            temp_dir,
        })
    }
}

/// A complete test environment: a session, its mock provider, and the temp
/// directory holding its files.
pub struct TestHarness {
    /// The mock LLM provider. Present even when the session runs without one.
    pub mock_provider: Arc<MockProvider>,
    /// The session under test.
    pub session: AgentSession,
    provider: Option<Arc<dyn ProviderAdapter>>,
    options: SessionOptions,
    /// Temp directory kept alive for cleanup on drop.
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The data directory holding the session's files.
    pub fn data_dir(&self) -> &Path {
        self.session.data_dir()
    }

    /// Send a message through the session and return the reply.
    pub async fn send_message(&mut self, text: &str) -> Result<String, TandemError> {
        self.session.handle_message(text).await
    }

    /// Add a response to the mock provider's queue.
    pub async fn add_provider_response(&self, text: &str) {
        self.mock_provider.push_response(text).await;
    }

    /// Closes the current session and opens a fresh one over the same
    /// directory, restoring whatever was saved.
    pub async fn reopen(&mut self) -> Result<(), TandemError> {
        self.session.close().await?;
        let profile = UserProfile::create_default(Some(self.session.user_id()), None);
        self.session = AgentSession::open(
            self.provider.clone(),
            profile,
            self.temp_dir.path(),
            self.options,
        )?;
        Ok(())
    }
}
