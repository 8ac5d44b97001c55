// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile store for the Tandem assistant.
//!
//! A [`UserProfile`] holds identity, [`UserPreferences`], an append-only
//! event log, and learned patterns. It round-trips through one JSON file.

pub mod preferences;
pub mod profile;

pub use preferences::{Settings, UserPreferences};
pub use profile::{DEFAULT_USER_ID, DEFAULT_USER_NAME, ProfileEvent, UserProfile};
