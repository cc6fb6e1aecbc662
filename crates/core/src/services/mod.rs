//! Business logic services.

#![allow(missing_docs)]

pub mod pulse_check;
pub mod question;
pub mod ranking;
pub mod rate_limit;
pub mod session;
pub mod session_code;
pub mod validation;
pub mod vote;

pub use pulse_check::{
    PulseCheckService, PulseCheckTally, SubmitFeedbackInput, aggregate_pulse_check,
    pulse_check_for,
};
pub use question::{QuestionService, QuestionView, SubmitQuestionInput};
pub use ranking::{Rankable, compare_questions, rank_questions};
pub use rate_limit::{
    ActionLimits, PurgeTask, RateLimitAction, RateLimitConfig, RateLimitResult, RateLimiter,
};
pub use session::{CreateSessionInput, SessionService, UpdateSessionInput};
pub use session_code::{SessionCodeAllocator, SessionCodeStore};
pub use validation::{
    QuestionValidation, SessionInputErrors, SessionValidation, validate_participant_id,
    validate_question_input, validate_session_input,
};
pub use vote::{VoteInput, VoteResult, VoteService};
