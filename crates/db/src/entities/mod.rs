//! Database entities.

pub mod pulse_check_feedback;
pub mod question;
pub mod session;
pub mod vote;

pub use pulse_check_feedback::Entity as PulseCheckFeedback;
pub use question::Entity as Question;
pub use session::Entity as Session;
pub use vote::Entity as Vote;
