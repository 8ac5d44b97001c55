// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tandem integration tests.
//!
//! Provides a mock provider and a session harness for fast, deterministic
//! tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with queued responses and failures
//! - [`TestHarness`] - A session over a temp directory, wired to a mock provider

pub mod harness;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{CapturedPrompt, MockProvider};
