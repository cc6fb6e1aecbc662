//! Question service.

use std::collections::{HashMap, HashSet};

use askboard_common::{AppError, AppResult, IdGenerator};
use askboard_db::entities::question::{self, QuestionStatus};
use askboard_db::repositories::{PulseCheckRepository, QuestionRepository, VoteRepository};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::pulse_check::{PulseCheckTally, tally_by_question};
use super::ranking::rank_questions;
use super::rate_limit::{RateLimitAction, RateLimiter};
use super::session::SessionService;
use super::validation::{validate_participant_id, validate_question_input};

/// Input for submitting a question to a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuestionInput {
    pub code: String,
    pub content: String,
    pub participant_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
}

/// A question as shown to participants and hosts.
///
/// The submitter's participant id is never exposed. `has_voted` is only
/// present when the viewer identified themselves, and `pulse_check` only
/// for answered questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub session_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub status: QuestionStatus,
    pub vote_count: i32,
    pub created_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_check: Option<PulseCheckTally>,
}

impl From<question::Model> for QuestionView {
    fn from(q: question::Model) -> Self {
        Self {
            id: q.id,
            session_id: q.session_id,
            content: q.content,
            author_name: q.author_name,
            status: q.status,
            vote_count: q.vote_count,
            created_at: q.created_at,
            updated_at: q.updated_at,
            has_voted: None,
            pulse_check: None,
        }
    }
}

/// Service for submitting, listing and moderating questions.
#[derive(Clone)]
pub struct QuestionService {
    session_service: SessionService,
    question_repo: QuestionRepository,
    vote_repo: VoteRepository,
    feedback_repo: PulseCheckRepository,
    rate_limiter: RateLimiter,
    id_gen: IdGenerator,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(
        session_service: SessionService,
        question_repo: QuestionRepository,
        vote_repo: VoteRepository,
        feedback_repo: PulseCheckRepository,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            session_service,
            question_repo,
            vote_repo,
            feedback_repo,
            rate_limiter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a question to the session joined by `input.code`.
    ///
    /// Starts as `pending` in moderated sessions, `approved` otherwise.
    pub async fn submit(&self, input: SubmitQuestionInput) -> AppResult<question::Model> {
        let validation = validate_question_input(
            &input.content,
            &input.participant_id,
            input.author_name.as_deref(),
        );
        if !validation.is_valid {
            return Err(AppError::Validation(validation.errors));
        }

        self.rate_limiter
            .enforce(RateLimitAction::SubmitQuestion, &input.participant_id)
            .await?;

        let session = self.session_service.get_by_code(&input.code).await?;
        if !session.is_accepting_questions {
            return Err(AppError::Forbidden(
                "Session is not accepting questions".to_string(),
            ));
        }

        let status = if session.moderation_enabled {
            QuestionStatus::Pending
        } else {
            QuestionStatus::Approved
        };

        let author_name = input
            .author_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        let now = Utc::now();
        let model = question::ActiveModel {
            id: Set(self.id_gen.generate()),
            session_id: Set(session.id.clone()),
            content: Set(input.content.trim().to_string()),
            author_name: Set(author_name),
            participant_id: Set(input.participant_id),
            status: Set(status),
            vote_count: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let created = self.question_repo.create(model).await?;
        info!(question_id = %created.id, session_id = %session.id, status = ?created.status, "Question submitted");
        Ok(created)
    }

    /// Participant view of a session's questions, ranked.
    ///
    /// Pending and dismissed questions are left out. When `participant_id`
    /// is given each question carries `hasVoted`.
    pub async fn list_for_participant(
        &self,
        code: &str,
        participant_id: Option<&str>,
    ) -> AppResult<Vec<QuestionView>> {
        if let Some(pid) = participant_id {
            validate_participant_id(pid).map_err(AppError::Validation)?;
        }

        let session = self.session_service.get_by_code(code).await?;
        let questions = self
            .question_repo
            .find_by_session_with_statuses(&session.id, &QuestionStatus::PARTICIPANT_VISIBLE)
            .await?;
        let ranked = rank_questions(&questions);

        let voted = match participant_id {
            Some(pid) => {
                let ids: Vec<String> = ranked.iter().map(|q| q.id.clone()).collect();
                Some(self.vote_repo.voted_question_ids(pid, &ids).await?)
            }
            None => None,
        };

        let tallies = self.answered_tallies(&ranked).await?;
        Ok(build_views(ranked, voted.as_ref(), &tallies))
    }

    /// Host view: every question of an owned session, ranked.
    pub async fn list_for_host(
        &self,
        host_id: &str,
        session_id: &str,
    ) -> AppResult<Vec<QuestionView>> {
        let session = self.session_service.get_owned(host_id, session_id).await?;
        let questions = self.question_repo.find_by_session(&session.id).await?;
        let ranked = rank_questions(&questions);

        let tallies = self.answered_tallies(&ranked).await?;
        Ok(build_views(ranked, None, &tallies))
    }

    /// Move a question to a new status. Only the session host may do this.
    pub async fn update_status(
        &self,
        host_id: &str,
        question_id: &str,
        status: QuestionStatus,
    ) -> AppResult<question::Model> {
        let question = self.question_repo.get_by_id(question_id).await?;
        self.session_service
            .get_owned(host_id, &question.session_id)
            .await?;

        if question.status == status {
            return Ok(question);
        }

        let previous = question.status;
        let mut active = question.into_active_model();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.question_repo.update(active).await?;
        info!(question_id = %updated.id, from = ?previous, to = ?status, "Question status changed");
        Ok(updated)
    }

    async fn answered_tallies(
        &self,
        questions: &[question::Model],
    ) -> AppResult<HashMap<String, PulseCheckTally>> {
        let answered: Vec<String> = questions
            .iter()
            .filter(|q| q.status == QuestionStatus::Answered)
            .map(|q| q.id.clone())
            .collect();

        let records = self.feedback_repo.find_by_questions(&answered).await?;
        Ok(tally_by_question(&records))
    }
}

fn build_views(
    ranked: Vec<question::Model>,
    voted: Option<&HashSet<String>>,
    tallies: &HashMap<String, PulseCheckTally>,
) -> Vec<QuestionView> {
    ranked
        .into_iter()
        .map(|q| {
            let has_voted = voted.map(|ids| ids.contains(&q.id));
            let pulse_check = (q.status == QuestionStatus::Answered)
                .then(|| tallies.get(&q.id).copied().unwrap_or_default());
            QuestionView {
                has_voted,
                pulse_check,
                ..QuestionView::from(q)
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use askboard_common::config::SessionConfig;
    use askboard_db::entities::pulse_check_feedback::{self, PulseFeedback};
    use askboard_db::entities::{session, vote};
    use askboard_db::repositories::SessionRepository;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    const PARTICIPANT: &str = "3f2b8c1e-9a4d-4e6f-8b2a-1c3d5e7f9a0b";

    fn create_test_session(moderation_enabled: bool) -> session::Model {
        let now = Utc::now();
        session::Model {
            id: "s1".to_string(),
            code: "K7Q2ZD".to_string(),
            host_id: "host1".to_string(),
            title: "Quarterly all-hands".to_string(),
            description: None,
            is_active: true,
            is_accepting_questions: true,
            moderation_enabled,
            expires_at: (now + Duration::hours(24)).into(),
            created_at: now.into(),
            updated_at: None,
        }
    }

    fn create_test_question(id: &str, status: QuestionStatus, votes: i32) -> question::Model {
        question::Model {
            id: id.to_string(),
            session_id: "s1".to_string(),
            content: format!("Question {id}?"),
            author_name: None,
            participant_id: PARTICIPANT.to_string(),
            status,
            vote_count: votes,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> QuestionService {
        let db = Arc::new(db);
        QuestionService::new(
            SessionService::new(
                SessionRepository::new(db.clone()),
                &SessionConfig::default(),
            ),
            QuestionRepository::new(db.clone()),
            VoteRepository::new(db.clone()),
            PulseCheckRepository::new(db),
            RateLimiter::new(),
        )
    }

    fn submit_input(content: &str) -> SubmitQuestionInput {
        SubmitQuestionInput {
            code: "K7Q2ZD".to_string(),
            content: content.to_string(),
            participant_id: PARTICIPANT.to_string(),
            author_name: None,
        }
    }

    #[tokio::test]
    async fn test_submit_reports_every_invalid_field() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .submit(SubmitQuestionInput {
                code: "K7Q2ZD".to_string(),
                content: String::new(),
                participant_id: "bogus".to_string(),
                author_name: Some("n".repeat(101)),
            })
            .await;

        match result {
            Err(AppError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["content", "participantId", "authorName"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_moderated_session_starts_pending() {
        let created = create_test_question("q1", QuestionStatus::Pending, 0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_session(true)]])
            .append_query_results([[created.clone()]])
            .into_connection();

        let result = service(db)
            .submit(submit_input("When is the next release?"))
            .await
            .unwrap();

        assert_eq!(result.status, QuestionStatus::Pending);
    }

    #[tokio::test]
    async fn test_submit_closed_session_is_forbidden() {
        let mut session = create_test_session(false);
        session.is_accepting_questions = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session]])
            .into_connection();

        let result = service(db).submit(submit_input("Anyone there?")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_submit_sixth_question_is_rate_limited() {
        let mut db = MockDatabase::new(DatabaseBackend::Postgres);
        for i in 0..5 {
            db = db
                .append_query_results([[create_test_session(false)]])
                .append_query_results([[create_test_question(
                    &format!("q{i}"),
                    QuestionStatus::Approved,
                    0,
                )]]);
        }
        let service = service(db.into_connection());

        for _ in 0..5 {
            service.submit(submit_input("Is this thing on?")).await.unwrap();
        }

        let result = service.submit(submit_input("Is this thing on?")).await;
        assert!(matches!(result, Err(AppError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_list_for_participant_ranks_and_marks_votes() {
        let questions = vec![
            create_test_question("answered", QuestionStatus::Answered, 50),
            create_test_question("popular", QuestionStatus::Approved, 10),
            create_test_question("live", QuestionStatus::BeingAnswered, 0),
        ];
        let my_vote = vote::Model {
            id: "v1".to_string(),
            question_id: "popular".to_string(),
            participant_id: PARTICIPANT.to_string(),
            created_at: Utc::now().into(),
        };
        let feedback = pulse_check_feedback::Model {
            id: "f1".to_string(),
            question_id: "answered".to_string(),
            participant_id: PARTICIPANT.to_string(),
            feedback: PulseFeedback::Helpful,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_session(false)]])
            .append_query_results([questions])
            .append_query_results([[my_vote]])
            .append_query_results([[feedback]])
            .into_connection();

        let views = service(db)
            .list_for_participant("K7Q2ZD", Some(PARTICIPANT))
            .await
            .unwrap();

        let ids: Vec<&str> = views.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["live", "popular", "answered"]);

        assert_eq!(views[1].has_voted, Some(true));
        assert_eq!(views[0].has_voted, Some(false));

        assert!(views[0].pulse_check.is_none());
        assert!(views[1].pulse_check.is_none());
        assert_eq!(views[2].pulse_check.unwrap().helpful, 1);
    }

    #[tokio::test]
    async fn test_pulse_check_field_omitted_unless_answered() {
        let approved = QuestionView::from(create_test_question("q1", QuestionStatus::Approved, 0));
        let json = serde_json::to_value(&approved).unwrap();
        assert!(json.get("pulseCheck").is_none());
        assert!(json.get("hasVoted").is_none());
        assert!(json.get("participantId").is_none());

        let views = build_views(
            vec![create_test_question("q2", QuestionStatus::Answered, 0)],
            None,
            &HashMap::new(),
        );
        let json = serde_json::to_value(&views[0]).unwrap();
        assert_eq!(
            json["pulseCheck"],
            serde_json::json!({"helpful": 0, "neutral": 0, "not_helpful": 0})
        );
    }

    #[tokio::test]
    async fn test_list_for_host_requires_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_session(false)]])
            .into_connection();

        let result = service(db).list_for_host("someone-else", "s1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_for_host_includes_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_session(true)]])
            .append_query_results([[
                create_test_question("q1", QuestionStatus::Pending, 0),
                create_test_question("q2", QuestionStatus::Dismissed, 0),
            ]])
            .into_connection();

        let views = service(db).list_for_host("host1", "s1").await.unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.has_voted.is_none()));
    }

    #[tokio::test]
    async fn test_update_status() {
        let question = create_test_question("q1", QuestionStatus::Approved, 3);
        let mut updated = question.clone();
        updated.status = QuestionStatus::BeingAnswered;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[question]])
            .append_query_results([[create_test_session(false)]])
            .append_query_results([[updated]])
            .into_connection();

        let result = service(db)
            .update_status("host1", "q1", QuestionStatus::BeingAnswered)
            .await
            .unwrap();

        assert_eq!(result.status, QuestionStatus::BeingAnswered);
    }

    #[tokio::test]
    async fn test_update_status_requires_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_question("q1", QuestionStatus::Approved, 0)]])
            .append_query_results([[create_test_session(false)]])
            .into_connection();

        let result = service(db)
            .update_status("intruder", "q1", QuestionStatus::Dismissed)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
