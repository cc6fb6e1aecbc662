//! Vote repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Vote, vote};
use crate::is_unique_violation;
use askboard_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a vote. A second vote by the same participant is a conflict.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Already voted on this question".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Remove a participant's vote. Returns whether a row was deleted.
    pub async fn delete(&self, question_id: &str, participant_id: &str) -> AppResult<bool> {
        let result = Vote::delete_many()
            .filter(vote::Column::QuestionId.eq(question_id))
            .filter(vote::Column::ParticipantId.eq(participant_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Which of the given questions a participant has voted on.
    pub async fn voted_question_ids(
        &self,
        participant_id: &str,
        question_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if question_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let votes = Vote::find()
            .filter(vote::Column::ParticipantId.eq(participant_id))
            .filter(vote::Column::QuestionId.is_in(question_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(votes.into_iter().map(|v| v.question_id).collect())
    }
}
