//! Identifier utilities.
//!
//! Rows get server-side ULIDs. Participants bring their own identifier, a
//! UUID-v4 shaped string that is only ever checked for shape.

use once_cell::sync::Lazy;
use regex::Regex;
use ulid::Ulid;
use uuid::Uuid;

static PARTICIPANT_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .unwrap_or_else(|e| unreachable!("participant id pattern is valid: {e}"))
});

/// Returns whether `value` has the UUID-v4 shape used for participant IDs.
///
/// Hex groups 8-4-4-4-12, version nibble `4`, variant nibble in `{8,9,a,b}`.
#[must_use]
pub fn is_participant_id(value: &str) -> bool {
    PARTICIPANT_ID_RE.is_match(value)
}

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new lowercase ULID for a row primary key.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a fresh participant identifier.
    ///
    /// Clients normally mint their own; this is for tooling and tests.
    #[must_use]
    pub fn generate_participant_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
