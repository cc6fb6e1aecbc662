//! Repositories wrapping sea-orm queries for each entity.

mod pulse_check;
mod question;
mod session;
mod vote;

pub use pulse_check::PulseCheckRepository;
pub use question::QuestionRepository;
pub use session::SessionRepository;
pub use vote::VoteRepository;
