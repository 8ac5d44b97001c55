// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One lazily opened session per user id.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tandem_agent::{AgentSession, SessionOptions};
use tandem_core::persist::validate_user_id;
use tandem_core::{ProviderAdapter, TandemError};
use tandem_profile::UserProfile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A session shared between concurrent requests for the same user.
pub type SharedSession = Arc<Mutex<AgentSession>>;

/// Sessions keyed by user id. Requests for one user serialize on that
/// user's mutex; different users never contend.
pub struct SessionPool {
    sessions: DashMap<String, SharedSession>,
    provider: Option<Arc<dyn ProviderAdapter>>,
    data_dir: PathBuf,
    options: SessionOptions,
    default_user_name: String,
}

impl SessionPool {
    pub fn new(
        provider: Option<Arc<dyn ProviderAdapter>>,
        data_dir: impl Into<PathBuf>,
        options: SessionOptions,
        default_user_name: impl Into<String>,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            provider,
            data_dir: data_dir.into(),
            options,
            default_user_name: default_user_name.into(),
        }
    }

    /// Returns the session for `user_id`, opening it on first use.
    ///
    /// Opening reads the user's files on the blocking pool, outside any map
    /// lock. When two requests race to open the same user, the first insert
    /// wins and the other freshly opened session is dropped unsaved.
    pub async fn get_or_open(&self, user_id: &str) -> Result<SharedSession, TandemError> {
        validate_user_id(user_id)?;
        if let Some(existing) = self.sessions.get(user_id) {
            return Ok(existing.value().clone());
        }

        let session = self.open_blocking(user_id).await?;
        match self.sessions.entry(user_id.to_string()) {
            Entry::Occupied(entry) => {
                debug!(user_id, "session opened concurrently; using the first one");
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                info!(user_id, "opened gateway session");
                Ok(entry.insert(Arc::new(Mutex::new(session))).value().clone())
            }
        }
    }

    async fn open_blocking(&self, user_id: &str) -> Result<AgentSession, TandemError> {
        let provider = self.provider.clone();
        let profile = UserProfile::create_default(Some(user_id), Some(&self.default_user_name));
        let data_dir = self.data_dir.clone();
        let options = self.options;
        tokio::task::spawn_blocking(move || AgentSession::open(provider, profile, data_dir, options))
            .await
            .map_err(|e| TandemError::Internal(format!("session open task failed: {e}")))?
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Closes and forgets every open session.
    pub async fn close_all(&self) {
        let sessions: Vec<(String, SharedSession)> = self
            .sessions
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        self.sessions.clear();

        for (user_id, session) in sessions {
            if let Err(e) = session.lock().await.close().await {
                warn!(user_id = %user_id, error = %e, "failed to close session");
            }
        }
    }
}
