// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tandem_agent::{AgentStatus, ContentItem};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Discovery size when the request leaves it out.
pub const DEFAULT_DISCOVER_LIMIT: usize = 10;

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response body for POST /api/chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub user_id: String,
}

/// Request body for POST /api/discover.
#[derive(Debug, Default, Deserialize)]
pub struct DiscoverRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Request body for POST /api/reflect.
#[derive(Debug, Default, Deserialize)]
pub struct ReflectRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response body for POST /api/reflect.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReflectResponse {
    pub insight: String,
}

/// Request body for POST /api/interests/add and /api/interests/remove.
#[derive(Debug, Deserialize)]
pub struct InterestRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub interest: String,
}

/// Response body for the interest mutation routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct InterestsResponse {
    pub interests: Vec<String>,
}

/// Response body for GET /api/interests/{user_id}.
#[derive(Debug, Serialize, Deserialize)]
pub struct PreferencesResponse {
    pub interests: Vec<String>,
    pub topics: Vec<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: usize,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        sessions: state.pool.len(),
    })
}

/// POST /api/chat
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }
    let user_id = state.user_id_or_default(body.user_id);
    let session = state.pool.get_or_open(&user_id).await?;
    let response = session.lock().await.handle_message(&body.message).await?;
    Ok(Json(ChatResponse { response, user_id }))
}

/// POST /api/discover
pub async fn post_discover(
    State(state): State<GatewayState>,
    Json(body): Json<DiscoverRequest>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let user_id = state.user_id_or_default(body.user_id);
    let limit = body.limit.unwrap_or(DEFAULT_DISCOVER_LIMIT);
    let session = state.pool.get_or_open(&user_id).await?;
    let items = session.lock().await.discover(limit).await?;
    Ok(Json(items))
}

/// POST /api/reflect
pub async fn post_reflect(
    State(state): State<GatewayState>,
    Json(body): Json<ReflectRequest>,
) -> Result<Json<ReflectResponse>, ApiError> {
    let user_id = state.user_id_or_default(body.user_id);
    let session = state.pool.get_or_open(&user_id).await?;
    let insight = session.lock().await.reflect().await?;
    Ok(Json(ReflectResponse { insight }))
}

/// GET /api/status/{user_id}
pub async fn get_status(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
) -> Result<Json<AgentStatus>, ApiError> {
    let session = state.pool.get_or_open(&user_id).await?;
    let status = session.lock().await.get_status();
    Ok(Json(status))
}

/// POST /api/interests/add
pub async fn post_add_interest(
    State(state): State<GatewayState>,
    Json(body): Json<InterestRequest>,
) -> Result<Json<InterestsResponse>, ApiError> {
    update_interests(state, body, true).await
}

/// POST /api/interests/remove
pub async fn post_remove_interest(
    State(state): State<GatewayState>,
    Json(body): Json<InterestRequest>,
) -> Result<Json<InterestsResponse>, ApiError> {
    update_interests(state, body, false).await
}

async fn update_interests(
    state: GatewayState,
    body: InterestRequest,
    add: bool,
) -> Result<Json<InterestsResponse>, ApiError> {
    let interest = body.interest.trim();
    if interest.is_empty() {
        return Err(ApiError::bad_request("interest must not be empty"));
    }
    let user_id = state.user_id_or_default(body.user_id);
    let session = state.pool.get_or_open(&user_id).await?;
    let mut session = session.lock().await;
    if add {
        session.add_interest(interest)?;
    } else {
        session.remove_interest(interest)?;
    }
    Ok(Json(InterestsResponse {
        interests: session.profile().interests().to_vec(),
    }))
}

/// GET /api/interests/{user_id}
pub async fn get_interests(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let session = state.pool.get_or_open(&user_id).await?;
    let session = session.lock().await;
    Ok(Json(PreferencesResponse {
        interests: session.profile().interests().to_vec(),
        topics: session.profile().topics().to_vec(),
    }))
}
