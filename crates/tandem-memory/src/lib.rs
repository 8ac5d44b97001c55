// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction memory for the Tandem assistant.
//!
//! Records user/agent exchanges in a bounded FIFO log, renders recent
//! history for prompts, and persists the log as a single JSON file.

pub mod store;
pub mod types;

pub use store::{DEFAULT_MAX_HISTORY, InteractionMemory, NO_CONTEXT};
pub use types::{Interaction, MemoryState, MemorySummary, Metadata};
