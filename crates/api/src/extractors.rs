//! Request extractors.

use askboard_common::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::middleware::HostIdentity;

/// Authenticated host extractor.
#[derive(Debug, Clone)]
pub struct HostUser(pub String);

impl<S> FromRequestParts<S> for HostUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the host identity middleware
        parts
            .extensions
            .get::<HostIdentity>()
            .map(|identity| Self(identity.0.clone()))
            .ok_or(AppError::Unauthorized)
    }
}
