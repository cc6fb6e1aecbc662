//! Question repository.

use std::sync::Arc;

use crate::entities::question::QuestionStatus;
use crate::entities::{Question, question};
use askboard_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a question by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::QuestionNotFound(id.to_string()))
    }

    /// All questions of a session regardless of status.
    ///
    /// Rows come back in storage order; display order is applied by the ranker.
    pub async fn find_by_session(&self, session_id: &str) -> AppResult<Vec<question::Model>> {
        Question::find()
            .filter(question::Column::SessionId.eq(session_id))
            .order_by_asc(question::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Questions of a session restricted to the given statuses.
    pub async fn find_by_session_with_statuses(
        &self,
        session_id: &str,
        statuses: &[QuestionStatus],
    ) -> AppResult<Vec<question::Model>> {
        Question::find()
            .filter(question::Column::SessionId.eq(session_id))
            .filter(question::Column::Status.is_in(statuses.iter().copied()))
            .order_by_asc(question::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new question.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a question.
    pub async fn update(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment vote count atomically.
    pub async fn increment_vote_count(&self, id: &str) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        Question::update_many()
            .col_expr(
                question::Column::VoteCount,
                Expr::col(question::Column::VoteCount).add(1),
            )
            .col_expr(question::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(question::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Decrement vote count atomically.
    pub async fn decrement_vote_count(&self, id: &str) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        Question::update_many()
            .col_expr(
                question::Column::VoteCount,
                Expr::cust("GREATEST(vote_count - 1, 0)"),
            )
            .col_expr(question::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(question::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
