//! Vote service.

use askboard_common::{AppError, AppResult, IdGenerator};
use askboard_db::entities::question::{self, QuestionStatus};
use askboard_db::entities::vote;
use askboard_db::repositories::{QuestionRepository, VoteRepository};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::rate_limit::{RateLimitAction, RateLimiter};
use super::validation::validate_participant_id;

/// Input for voting or unvoting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteInput {
    pub question_id: String,
    pub participant_id: String,
}

/// Vote state of a question after a vote change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub question_id: String,
    pub vote_count: i32,
    pub has_voted: bool,
}

/// Service for question upvotes.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    question_repo: QuestionRepository,
    rate_limiter: RateLimiter,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        vote_repo: VoteRepository,
        question_repo: QuestionRepository,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            vote_repo,
            question_repo,
            rate_limiter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Upvote a question. One vote per participant.
    pub async fn vote(&self, input: VoteInput) -> AppResult<VoteResult> {
        let question = self.votable_question(&input).await?;

        if matches!(
            question.status,
            QuestionStatus::Answered | QuestionStatus::Dismissed
        ) {
            return Err(AppError::BadRequest(
                "Voting is closed for this question".to_string(),
            ));
        }

        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question.id.clone()),
            participant_id: Set(input.participant_id),
            created_at: Set(Utc::now().into()),
        };
        self.vote_repo.create(model).await?;
        self.question_repo.increment_vote_count(&question.id).await?;

        let vote_count = self.current_count(&question.id).await?;
        info!(question_id = %question.id, vote_count, "Vote added");

        Ok(VoteResult {
            question_id: question.id,
            vote_count,
            has_voted: true,
        })
    }

    /// Withdraw a vote. The vote row is removed.
    pub async fn unvote(&self, input: VoteInput) -> AppResult<VoteResult> {
        let question = self.votable_question(&input).await?;

        let removed = self
            .vote_repo
            .delete(&question.id, &input.participant_id)
            .await?;
        if !removed {
            return Err(AppError::NotFound("Vote not found".to_string()));
        }
        self.question_repo.decrement_vote_count(&question.id).await?;

        let vote_count = self.current_count(&question.id).await?;
        info!(question_id = %question.id, vote_count, "Vote removed");

        Ok(VoteResult {
            question_id: question.id,
            vote_count,
            has_voted: false,
        })
    }

    /// Shared checks: participant id, rate limit, question visibility.
    async fn votable_question(&self, input: &VoteInput) -> AppResult<question::Model> {
        validate_participant_id(&input.participant_id).map_err(AppError::Validation)?;

        self.rate_limiter
            .enforce(RateLimitAction::Vote, &input.participant_id)
            .await?;

        let question = self.question_repo.get_by_id(&input.question_id).await?;
        if !question.status.is_participant_visible() {
            return Err(AppError::QuestionNotFound(input.question_id.clone()));
        }
        Ok(question)
    }

    async fn current_count(&self, question_id: &str) -> AppResult<i32> {
        Ok(self.question_repo.get_by_id(question_id).await?.vote_count)
    }
}
