//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, session};
use crate::is_unique_violation;
use askboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<session::Model>> {
        Session::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a session by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<session::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
    }

    /// Find a session by its join code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<session::Model>> {
        Session::find()
            .filter(session::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a join code is already taken.
    pub async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let count = Session::find()
            .filter(session::Column::Code.eq(code))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Sessions owned by a host, newest first.
    pub async fn find_by_host(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<session::Model>> {
        Session::find()
            .filter(session::Column::HostId.eq(host_id))
            .order_by_desc(session::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new session.
    ///
    /// A unique violation on the code column comes back as
    /// [`AppError::DuplicateCode`] so the allocator can retry.
    pub async fn create(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        let code = model.code.clone().take().unwrap_or_default();
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateCode(code)
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Update a session.
    pub async fn update(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a session. Questions, votes and feedback cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Session::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
