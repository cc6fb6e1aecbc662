//! HTTP API layer for askboard.
//!
//! This crate provides the JSON API:
//!
//! - **Endpoints**: sessions, questions, votes and pulse checks
//! - **Extractors**: host identity
//! - **Middleware**: host identity propagation, shared application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, HOST_USER_HEADER, host_identity_middleware};
