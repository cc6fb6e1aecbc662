//! Pulse-check feedback repository.

use std::sync::Arc;

use crate::entities::{PulseCheckFeedback, pulse_check_feedback};
use crate::is_unique_violation;
use askboard_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Repository for pulse-check feedback rows.
#[derive(Clone)]
pub struct PulseCheckRepository {
    db: Arc<DatabaseConnection>,
}

impl PulseCheckRepository {
    /// Create a new pulse-check repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert feedback. Feedback is write-once per participant and question.
    pub async fn create(
        &self,
        model: pulse_check_feedback::ActiveModel,
    ) -> AppResult<pulse_check_feedback::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Feedback already submitted for this question".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// All feedback on one question.
    pub async fn find_by_question(
        &self,
        question_id: &str,
    ) -> AppResult<Vec<pulse_check_feedback::Model>> {
        PulseCheckFeedback::find()
            .filter(pulse_check_feedback::Column::QuestionId.eq(question_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All feedback on a batch of questions.
    pub async fn find_by_questions(
        &self,
        question_ids: &[String],
    ) -> AppResult<Vec<pulse_check_feedback::Model>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }

        PulseCheckFeedback::find()
            .filter(pulse_check_feedback::Column::QuestionId.is_in(question_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
