//! Display order for questions.
//!
//! Host and participant views use the same order:
//!
//! 1. `being_answered` first,
//! 2. `answered` last,
//! 3. more votes first,
//! 4. older first,
//! 5. lower id first, so the order is total and never depends on input order.

use std::cmp::Ordering;

use askboard_db::entities::question::{self, QuestionStatus};
use chrono::{DateTime, FixedOffset};

/// Anything that can be placed in the question order.
pub trait Rankable {
    /// Moderation status.
    fn status(&self) -> QuestionStatus;
    /// Number of votes.
    fn vote_count(&self) -> i64;
    /// Creation time.
    fn created_at(&self) -> DateTime<FixedOffset>;
    /// Stable identifier for the final tie-break.
    fn id(&self) -> &str;
}

impl Rankable for question::Model {
    fn status(&self) -> QuestionStatus {
        self.status
    }

    fn vote_count(&self) -> i64 {
        i64::from(self.vote_count)
    }

    fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Status bucket: 0 = being answered, 1 = everything else, 2 = answered.
const fn status_bucket(status: QuestionStatus) -> u8 {
    match status {
        QuestionStatus::BeingAnswered => 0,
        QuestionStatus::Answered => 2,
        QuestionStatus::Pending | QuestionStatus::Approved | QuestionStatus::Dismissed => 1,
    }
}

/// Compare two questions in display order.
pub fn compare_questions<Q: Rankable + ?Sized>(a: &Q, b: &Q) -> Ordering {
    status_bucket(a.status())
        .cmp(&status_bucket(b.status()))
        .then_with(|| b.vote_count().cmp(&a.vote_count()))
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Return the questions in display order. The input is left untouched.
#[must_use]
pub fn rank_questions<Q: Rankable + Clone>(questions: &[Q]) -> Vec<Q> {
    let mut ranked = questions.to_vec();
    ranked.sort_by(compare_questions);
    ranked
}
