//! API endpoints.

mod pulse_check;
mod questions;
mod sessions;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/sessions", sessions::router())
        .nest("/questions", questions::router())
        .nest("/votes", votes::router())
        .nest("/pulse-check", pulse_check::router())
}
