// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Tandem assistant.
//!
//! Serves a small JSON API over axum. Each user id gets its own
//! [`AgentSession`](tandem_agent::AgentSession), opened on first request and
//! kept in a [`SessionPool`].

pub mod error;
pub mod handlers;
pub mod pool;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use pool::{SessionPool, SharedSession};
pub use server::{GatewayState, ServerConfig, router, start_server};
