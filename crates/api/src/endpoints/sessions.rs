//! Session endpoints.

use askboard_common::AppResult;
use askboard_core::{CreateSessionInput, UpdateSessionInput};
use askboard_db::entities::session;
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{extractors::HostUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Session as seen by hosts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_accepting_questions: bool,
    pub moderation_enabled: bool,
    pub expires_at: String,
    pub created_at: String,
}

impl From<session::Model> for SessionResponse {
    fn from(s: session::Model) -> Self {
        Self {
            id: s.id,
            code: s.code,
            title: s.title,
            description: s.description,
            is_active: s.is_active,
            is_accepting_questions: s.is_accepting_questions,
            moderation_enabled: s.moderation_enabled,
            expires_at: s.expires_at.to_rfc3339(),
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

/// Show session request (participants join by code).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSessionRequest {
    pub code: String,
}

/// List sessions request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Delete session request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionRequest {
    pub session_id: String,
}

const fn default_limit() -> u64 {
    20
}

// ==================== Handlers ====================

/// Create a session.
async fn create(
    HostUser(host_id): HostUser,
    State(state): State<AppState>,
    Json(req): Json<CreateSessionInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.session_service.create(&host_id, req).await?;

    Ok(ApiResponse::created(session.into()))
}

/// Look up a joinable session by code.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowSessionRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.session_service.get_by_code(&req.code).await?;

    Ok(ApiResponse::ok(session.into()))
}

/// List the caller's sessions.
async fn list(
    HostUser(host_id): HostUser,
    State(state): State<AppState>,
    Json(req): Json<ListSessionsRequest>,
) -> AppResult<ApiResponse<Vec<SessionResponse>>> {
    let limit = req.limit.min(100);
    let sessions = state
        .session_service
        .list_for_host(&host_id, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(sessions.into_iter().map(Into::into).collect()))
}

/// Update a session.
async fn update(
    HostUser(host_id): HostUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateSessionInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.session_service.update(&host_id, req).await?;

    Ok(ApiResponse::ok(session.into()))
}

/// Delete a session.
async fn delete(
    HostUser(host_id): HostUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteSessionRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .session_service
        .delete(&host_id, &req.session_id)
        .await?;

    Ok(ApiResponse::ok(()))
}

// ==================== Router ====================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/update", post(update))
        .route("/delete", post(delete))
}
