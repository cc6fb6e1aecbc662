//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use askboard_common::Config;
use askboard_core::{
    PulseCheckService, QuestionService, RateLimiter, SessionService, VoteService,
};
use askboard_db::repositories::{
    PulseCheckRepository, QuestionRepository, SessionRepository, VoteRepository,
};
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use sea_orm::DatabaseConnection;
use tracing::trace;

/// Header the fronting OAuth proxy sets to the signed-in host's id.
pub const HOST_USER_HEADER: &str = "x-authenticated-user";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub question_service: QuestionService,
    pub vote_service: VoteService,
    pub pulse_check_service: PulseCheckService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    ///
    /// Every service shares `rate_limiter`, so its counters are process-wide.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config, rate_limiter: RateLimiter) -> Self {
        let session_repo = SessionRepository::new(Arc::clone(&db));
        let question_repo = QuestionRepository::new(Arc::clone(&db));
        let vote_repo = VoteRepository::new(Arc::clone(&db));
        let feedback_repo = PulseCheckRepository::new(db);

        let session_service = SessionService::new(session_repo, &config.session);
        let question_service = QuestionService::new(
            session_service.clone(),
            question_repo.clone(),
            vote_repo.clone(),
            feedback_repo.clone(),
            rate_limiter.clone(),
        );
        let vote_service =
            VoteService::new(vote_repo, question_repo.clone(), rate_limiter.clone());
        let pulse_check_service =
            PulseCheckService::new(feedback_repo, question_repo, rate_limiter);

        Self {
            session_service,
            question_service,
            vote_service,
            pulse_check_service,
        }
    }
}

/// Host identity taken from [`HOST_USER_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity(pub String);

/// Host identity middleware.
///
/// Copies the proxy-supplied host id into the request extensions. Requests
/// without it pass through untouched; host-only handlers reject them.
pub async fn host_identity_middleware(mut req: Request<Body>, next: Next) -> Response {
    if let Some(value) = req.headers().get(HOST_USER_HEADER)
        && let Ok(host_id) = value.to_str()
    {
        let host_id = host_id.trim();
        if !host_id.is_empty() {
            trace!(host_id, "Host identity attached");
            let identity = HostIdentity(host_id.to_string());
            req.extensions_mut().insert(identity);
        }
    }

    next.run(req).await
}
