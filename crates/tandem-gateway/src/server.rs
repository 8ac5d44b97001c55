// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use tandem_core::TandemError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::pool::SessionPool;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub pool: Arc<SessionPool>,
    /// User id for requests that omit one.
    pub default_user_id: String,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(pool: Arc<SessionPool>, default_user_id: impl Into<String>) -> Self {
        Self {
            pool,
            default_user_id: default_user_id.into(),
            start_time: Instant::now(),
        }
    }

    pub(crate) fn user_id_or_default(&self, user_id: Option<String>) -> String {
        user_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.default_user_id.clone())
    }
}

/// Gateway server bind address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the gateway router:
/// - GET /health
/// - POST /api/chat, /api/discover, /api/reflect
/// - GET /api/status/{user_id}
/// - POST /api/interests/add, /api/interests/remove
/// - GET /api/interests/{user_id}
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/chat", post(handlers::post_chat))
        .route("/api/discover", post(handlers::post_discover))
        .route("/api/reflect", post(handlers::post_reflect))
        .route("/api/status/{user_id}", get(handlers::get_status))
        .route("/api/interests/add", post(handlers::post_add_interest))
        .route("/api/interests/remove", post(handlers::post_remove_interest))
        .route("/api/interests/{user_id}", get(handlers::get_interests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway server and run until `shutdown` resolves.
///
/// Open sessions are closed, and therefore saved, before returning.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), TandemError> {
    let pool = state.pool.clone();
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TandemError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| TandemError::Internal(format!("gateway server error: {e}")));

    pool.close_all().await;
    tracing::info!("Gateway server stopped");
    served
}
