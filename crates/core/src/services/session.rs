//! Session service.

use askboard_common::config::SessionConfig;
use askboard_common::{AppError, AppResult, IdGenerator};
use askboard_db::entities::session;
use askboard_db::repositories::SessionRepository;
use chrono::{Duration, Utc};
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use tracing::info;

use super::session_code::{SessionCodeAllocator, is_valid_code, normalize_code};
use super::validation::validate_session_input;

/// Input for creating a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub moderation_enabled: bool,
}

/// Input for updating a session. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionInput {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_accepting_questions: Option<bool>,
    #[serde(default)]
    pub moderation_enabled: Option<bool>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Service for managing sessions.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    allocator: SessionCodeAllocator,
    duration: Duration,
    id_gen: IdGenerator,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub fn new(session_repo: SessionRepository, config: &SessionConfig) -> Self {
        Self {
            session_repo,
            allocator: SessionCodeAllocator::new(),
            duration: Duration::hours(config.duration_hours),
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a session owned by `host_id` with a freshly allocated join code.
    pub async fn create(
        &self,
        host_id: &str,
        input: CreateSessionInput,
    ) -> AppResult<session::Model> {
        let validation = validate_session_input(&input.title, input.description.as_deref());
        if !validation.is_valid {
            return Err(AppError::Validation(validation.into_field_errors()));
        }

        let id = self.id_gen.generate();
        let title = input.title.trim().to_string();
        let description = non_empty(input.description.as_deref());
        let now = Utc::now();
        let expires_at = now + self.duration;

        let session = self
            .allocator
            .allocate_and_persist(&self.session_repo, |code| {
                let repo = self.session_repo.clone();
                let model = session::ActiveModel {
                    id: Set(id.clone()),
                    code: Set(code),
                    host_id: Set(host_id.to_string()),
                    title: Set(title.clone()),
                    description: Set(description.clone()),
                    is_active: Set(true),
                    is_accepting_questions: Set(true),
                    moderation_enabled: Set(input.moderation_enabled),
                    expires_at: Set(expires_at.into()),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };
                async move { repo.create(model).await }
            })
            .await?;

        info!(session_id = %session.id, code = %session.code, host_id = %host_id, "Session created");
        Ok(session)
    }

    /// Look up a joinable session by code.
    ///
    /// Inactive and expired sessions are reported as not found.
    pub async fn get_by_code(&self, code: &str) -> AppResult<session::Model> {
        let code = normalize_code(code);
        if !is_valid_code(&code) {
            return Err(AppError::SessionNotFound(code));
        }

        let session = self
            .session_repo
            .find_by_code(&code)
            .await?
            .ok_or_else(|| AppError::SessionNotFound(code.clone()))?;

        if !session.is_active || session.expires_at <= Utc::now() {
            return Err(AppError::SessionNotFound(code));
        }

        Ok(session)
    }

    /// Get a session the host owns.
    pub async fn get_owned(&self, host_id: &str, session_id: &str) -> AppResult<session::Model> {
        let session = self.session_repo.get_by_id(session_id).await?;
        if session.host_id != host_id {
            return Err(AppError::Forbidden("Not the session host".to_string()));
        }
        Ok(session)
    }

    /// Sessions created by a host, newest first.
    pub async fn list_for_host(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<session::Model>> {
        self.session_repo.find_by_host(host_id, limit, offset).await
    }

    /// Update title, description or flags of a session.
    pub async fn update(
        &self,
        host_id: &str,
        input: UpdateSessionInput,
    ) -> AppResult<session::Model> {
        let session = self.get_owned(host_id, &input.session_id).await?;

        if input.title.is_some() || input.description.is_some() {
            let title = input.title.as_deref().unwrap_or(&session.title);
            let description = input
                .description
                .as_deref()
                .or(session.description.as_deref());
            let validation = validate_session_input(title, description);
            if !validation.is_valid {
                return Err(AppError::Validation(validation.into_field_errors()));
            }
        }

        let mut active = session.into_active_model();

        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(non_empty(Some(&description)));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(accepting) = input.is_accepting_questions {
            active.is_accepting_questions = Set(accepting);
        }
        if let Some(moderation) = input.moderation_enabled {
            active.moderation_enabled = Set(moderation);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.session_repo.update(active).await?;
        info!(session_id = %updated.id, "Session updated");
        Ok(updated)
    }

    /// Delete a session and everything under it.
    pub async fn delete(&self, host_id: &str, session_id: &str) -> AppResult<()> {
        let session = self.get_owned(host_id, session_id).await?;
        self.session_repo.delete(&session.id).await?;
        info!(session_id = %session.id, "Session deleted");
        Ok(())
    }
}
