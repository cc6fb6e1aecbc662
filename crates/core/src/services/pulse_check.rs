//! Pulse-check feedback on answered questions.

use std::collections::HashMap;

use askboard_common::{AppError, AppResult, IdGenerator};
use askboard_db::entities::pulse_check_feedback::{self, PulseFeedback};
use askboard_db::entities::question::{self, QuestionStatus};
use askboard_db::repositories::{PulseCheckRepository, QuestionRepository};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::rate_limit::{RateLimitAction, RateLimiter};
use super::validation::validate_participant_id;

/// Feedback counts for one question. Every category is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseCheckTally {
    pub helpful: u64,
    pub neutral: u64,
    pub not_helpful: u64,
}

impl PulseCheckTally {
    /// Count one feedback value.
    pub const fn record(&mut self, feedback: PulseFeedback) {
        match feedback {
            PulseFeedback::Helpful => self.helpful += 1,
            PulseFeedback::Neutral => self.neutral += 1,
            PulseFeedback::NotHelpful => self.not_helpful += 1,
        }
    }

    /// Total number of responses.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.helpful + self.neutral + self.not_helpful
    }
}

/// Tally feedback records for a single question.
pub fn aggregate_pulse_check<'a, I>(records: I) -> PulseCheckTally
where
    I: IntoIterator<Item = &'a pulse_check_feedback::Model>,
{
    records
        .into_iter()
        .fold(PulseCheckTally::default(), |mut tally, record| {
            tally.record(record.feedback);
            tally
        })
}

/// Tally for a question in `status`, or `None` unless it is answered.
///
/// `None` means the field is left out of the response, not reported as zeros.
pub fn pulse_check_for<'a, I>(status: QuestionStatus, records: I) -> Option<PulseCheckTally>
where
    I: IntoIterator<Item = &'a pulse_check_feedback::Model>,
{
    (status == QuestionStatus::Answered).then(|| aggregate_pulse_check(records))
}

/// Group feedback rows by question and tally each group.
#[must_use]
pub fn tally_by_question(
    records: &[pulse_check_feedback::Model],
) -> HashMap<String, PulseCheckTally> {
    let mut tallies: HashMap<String, PulseCheckTally> = HashMap::new();
    for record in records {
        tallies
            .entry(record.question_id.clone())
            .or_default()
            .record(record.feedback);
    }
    tallies
}

/// Input for submitting feedback.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackInput {
    pub question_id: String,
    pub participant_id: String,
    pub feedback: PulseFeedback,
}

/// Service for pulse-check feedback.
#[derive(Clone)]
pub struct PulseCheckService {
    feedback_repo: PulseCheckRepository,
    question_repo: QuestionRepository,
    rate_limiter: RateLimiter,
    id_gen: IdGenerator,
}

impl PulseCheckService {
    /// Create a new pulse-check service.
    #[must_use]
    pub const fn new(
        feedback_repo: PulseCheckRepository,
        question_repo: QuestionRepository,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            feedback_repo,
            question_repo,
            rate_limiter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a participant's feedback on an answered question.
    pub async fn submit(
        &self,
        input: SubmitFeedbackInput,
    ) -> AppResult<pulse_check_feedback::Model> {
        validate_participant_id(&input.participant_id).map_err(AppError::Validation)?;

        self.rate_limiter
            .enforce(RateLimitAction::Feedback, &input.participant_id)
            .await?;

        let question = self.visible_question(&input.question_id).await?;
        if question.status != QuestionStatus::Answered {
            return Err(AppError::BadRequest(
                "Feedback is only accepted for answered questions".to_string(),
            ));
        }

        let model = pulse_check_feedback::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question.id.clone()),
            participant_id: Set(input.participant_id),
            feedback: Set(input.feedback),
            created_at: Set(Utc::now().into()),
        };

        let created = self.feedback_repo.create(model).await?;
        info!(question_id = %question.id, feedback = ?created.feedback, "Pulse check recorded");
        Ok(created)
    }

    /// Current tally for a question. `None` unless the question is answered.
    ///
    /// Questions participants cannot see are reported as not found.
    pub async fn tally(&self, question_id: &str) -> AppResult<Option<PulseCheckTally>> {
        let question = self.visible_question(question_id).await?;
        self.tally_for(&question).await
    }

    async fn visible_question(&self, question_id: &str) -> AppResult<question::Model> {
        let question = self.question_repo.get_by_id(question_id).await?;
        if !question.status.is_participant_visible() {
            return Err(AppError::QuestionNotFound(question_id.to_string()));
        }
        Ok(question)
    }

    /// Tally for an already loaded question.
    pub async fn tally_for(&self, question: &question::Model) -> AppResult<Option<PulseCheckTally>> {
        if question.status != QuestionStatus::Answered {
            return Ok(None);
        }
        let records = self.feedback_repo.find_by_question(&question.id).await?;
        Ok(pulse_check_for(question.status, &records))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use askboard_db::entities::question;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    const PARTICIPANT: &str = "3f2b8c1e-9a4d-4e6f-8b2a-1c3d5e7f9a0b";

    fn record(question_id: &str, feedback: PulseFeedback) -> pulse_check_feedback::Model {
        pulse_check_feedback::Model {
            id: format!("f-{question_id}-{feedback:?}"),
            question_id: question_id.to_string(),
            participant_id: PARTICIPANT.to_string(),
            feedback,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_question(id: &str, status: QuestionStatus) -> question::Model {
        question::Model {
            id: id.to_string(),
            session_id: "s1".to_string(),
            content: "What ships next quarter?".to_string(),
            author_name: None,
            participant_id: PARTICIPANT.to_string(),
            status,
            vote_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> PulseCheckService {
        let db = Arc::new(db);
        PulseCheckService::new(
            PulseCheckRepository::new(db.clone()),
            QuestionRepository::new(db),
            RateLimiter::new(),
        )
    }

    #[test]
    fn test_aggregate_empty_has_all_categories() {
        let tally = aggregate_pulse_check(&[]);
        assert_eq!(tally, PulseCheckTally::default());
        assert_eq!(
            serde_json::to_value(tally).unwrap(),
            serde_json::json!({"helpful": 0, "neutral": 0, "not_helpful": 0})
        );
    }

    #[test]
    fn test_aggregate_counts() {
        let records = vec![
            record("q1", PulseFeedback::Helpful),
            record("q1", PulseFeedback::Neutral),
            record("q1", PulseFeedback::Helpful),
        ];
        let tally = aggregate_pulse_check(&records);
        assert_eq!(
            tally,
            PulseCheckTally {
                helpful: 2,
                neutral: 1,
                not_helpful: 0
            }
        );
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn test_pulse_check_only_for_answered() {
        let records = vec![record("q1", PulseFeedback::NotHelpful)];

        for status in [
            QuestionStatus::Pending,
            QuestionStatus::Approved,
            QuestionStatus::Dismissed,
            QuestionStatus::BeingAnswered,
        ] {
            assert!(pulse_check_for(status, &records).is_none(), "{status:?}");
        }

        let tally = pulse_check_for(QuestionStatus::Answered, &records).unwrap();
        assert_eq!(tally.not_helpful, 1);
    }

    #[test]
    fn test_answered_without_feedback_is_zeros_not_absent() {
        let tally = pulse_check_for(QuestionStatus::Answered, &[]);
        assert_eq!(tally, Some(PulseCheckTally::default()));
    }

    #[test]
    fn test_tally_by_question() {
        let records = vec![
            record("q1", PulseFeedback::Helpful),
            record("q2", PulseFeedback::Neutral),
            record("q1", PulseFeedback::NotHelpful),
        ];
        let tallies = tally_by_question(&records);

        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies["q1"].helpful, 1);
        assert_eq!(tallies["q1"].not_helpful, 1);
        assert_eq!(tallies["q2"].neutral, 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_unanswered_question() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_question("q1", QuestionStatus::Approved)]])
            .into_connection();

        let result = service(db)
            .submit(SubmitFeedbackInput {
                question_id: "q1".to_string(),
                participant_id: PARTICIPANT.to_string(),
                feedback: PulseFeedback::Helpful,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_participant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .submit(SubmitFeedbackInput {
                question_id: "q1".to_string(),
                participant_id: "not-a-uuid".to_string(),
                feedback: PulseFeedback::Helpful,
            })
            .await;

        match result {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors[0].field, "participantId");
                assert_eq!(errors[0].message, "Invalid participant ID");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_answered_question() {
        let question = create_test_question("q1", QuestionStatus::Answered);
        let stored = record("q1", PulseFeedback::Helpful);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[question]])
            .append_query_results([[stored.clone()]])
            .into_connection();

        let created = service(db)
            .submit(SubmitFeedbackInput {
                question_id: "q1".to_string(),
                participant_id: PARTICIPANT.to_string(),
                feedback: PulseFeedback::Helpful,
            })
            .await
            .unwrap();

        assert_eq!(created.feedback, PulseFeedback::Helpful);
    }

    #[tokio::test]
    async fn test_tally_absent_for_unanswered() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_question("q1", QuestionStatus::BeingAnswered)]])
            .into_connection();

        assert_eq!(service(db).tally("q1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tally_for_answered() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_question("q1", QuestionStatus::Answered)]])
            .append_query_results([[
                record("q1", PulseFeedback::Helpful),
                record("q1", PulseFeedback::Helpful),
            ]])
            .into_connection();

        let tally = service(db).tally("q1").await.unwrap().unwrap();
        assert_eq!(tally.helpful, 2);
        assert_eq!(tally.total(), 2);
    }

    #[tokio::test]
    async fn test_tally_hides_questions_participants_cannot_see() {
        for status in [QuestionStatus::Pending, QuestionStatus::Dismissed] {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_question("q1", status)]])
                .into_connection();

            let result = service(db).tally("q1").await;
            assert!(matches!(result, Err(AppError::QuestionNotFound(_))));
        }
    }

    #[tokio::test]
    async fn test_submit_on_pending_question_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_question("q1", QuestionStatus::Pending)]])
            .into_connection();

        let result = service(db)
            .submit(SubmitFeedbackInput {
                question_id: "q1".to_string(),
                participant_id: PARTICIPANT.to_string(),
                feedback: PulseFeedback::Neutral,
            })
            .await;

        assert!(matches!(result, Err(AppError::QuestionNotFound(_))));
    }
}
