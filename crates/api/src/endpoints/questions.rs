//! Question endpoints.

use askboard_common::AppResult;
use askboard_core::{QuestionView, SubmitQuestionInput};
use askboard_db::entities::question::QuestionStatus;
use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use crate::{extractors::HostUser, middleware::AppState, response::ApiResponse};

// ==================== Request Types ====================

/// Participant question list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuestionsRequest {
    pub code: String,
    #[serde(default)]
    pub participant_id: Option<String>,
}

/// Host question list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostListQuestionsRequest {
    pub session_id: String,
}

/// Change a question's status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub question_id: String,
    pub status: QuestionStatus,
}

// ==================== Handlers ====================

/// Submit a question.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<SubmitQuestionInput>,
) -> AppResult<ApiResponse<QuestionView>> {
    let question = state.question_service.submit(req).await?;

    Ok(ApiResponse::created(question.into()))
}

/// Ranked questions visible to participants.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListQuestionsRequest>,
) -> AppResult<ApiResponse<Vec<QuestionView>>> {
    let questions = state
        .question_service
        .list_for_participant(&req.code, req.participant_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(questions))
}

/// Every question of a session, for its host.
async fn host_list(
    HostUser(host_id): HostUser,
    State(state): State<AppState>,
    Json(req): Json<HostListQuestionsRequest>,
) -> AppResult<ApiResponse<Vec<QuestionView>>> {
    let questions = state
        .question_service
        .list_for_host(&host_id, &req.session_id)
        .await?;

    Ok(ApiResponse::ok(questions))
}

/// Approve, dismiss, start or finish answering a question.
async fn update_status(
    HostUser(host_id): HostUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<QuestionView>> {
    let question = state
        .question_service
        .update_status(&host_id, &req.question_id, req.status)
        .await?;

    Ok(ApiResponse::ok(question.into()))
}

// ==================== Router ====================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
        .route("/host-list", post(host_list))
        .route("/update-status", post(update_status))
}
