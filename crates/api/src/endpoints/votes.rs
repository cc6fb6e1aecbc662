//! Vote endpoints.

use askboard_common::AppResult;
use askboard_core::{VoteInput, VoteResult};
use axum::{Json, Router, extract::State, routing::post};

use crate::{middleware::AppState, response::ApiResponse};

/// Upvote a question.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<VoteInput>,
) -> AppResult<ApiResponse<VoteResult>> {
    let result = state.vote_service.vote(req).await?;

    Ok(ApiResponse::ok(result))
}

/// Withdraw a vote.
async fn delete(
    State(state): State<AppState>,
    Json(req): Json<VoteInput>,
) -> AppResult<ApiResponse<VoteResult>> {
    let result = state.vote_service.unvote(req).await?;

    Ok(ApiResponse::ok(result))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/delete", post(delete))
}
