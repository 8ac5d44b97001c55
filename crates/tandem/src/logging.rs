// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset: workspace crates at
/// `log_level`, everything else at `warn`.
pub fn default_filter(log_level: &str) -> String {
    format!("tandem={},warn", log_level.to_ascii_lowercase())
}

/// Installs the global fmt subscriber. Logs go to stderr so command output
/// on stdout stays clean.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
