//! Pulse-check endpoints.

use askboard_common::AppResult;
use askboard_core::{PulseCheckTally, SubmitFeedbackInput};
use askboard_db::entities::pulse_check_feedback::PulseFeedback;
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Stored feedback.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: String,
    pub question_id: String,
    pub feedback: PulseFeedback,
    pub created_at: String,
}

/// Show tally request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPulseCheckRequest {
    pub question_id: String,
}

/// Tally of one question. `pulseCheck` is absent unless it is answered.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseCheckResponse {
    pub question_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_check: Option<PulseCheckTally>,
}

/// Leave feedback on an answered question.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<SubmitFeedbackInput>,
) -> AppResult<ApiResponse<FeedbackResponse>> {
    let feedback = state.pulse_check_service.submit(req).await?;

    Ok(ApiResponse::created(FeedbackResponse {
        id: feedback.id,
        question_id: feedback.question_id,
        feedback: feedback.feedback,
        created_at: feedback.created_at.to_rfc3339(),
    }))
}

/// Current tally of a question.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowPulseCheckRequest>,
) -> AppResult<ApiResponse<PulseCheckResponse>> {
    let pulse_check = state.pulse_check_service.tally(&req.question_id).await?;

    Ok(ApiResponse::ok(PulseCheckResponse {
        question_id: req.question_id,
        pulse_check,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
}
