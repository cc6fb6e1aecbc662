//! Input validation for session and question submissions.
//!
//! Every field is checked on every call; a request with three bad fields
//! gets three messages back. Lengths are counted in characters after
//! trimming surrounding whitespace.

use std::borrow::Cow;

use askboard_common::{FieldError, is_participant_id};
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

/// Minimum session title length.
pub const TITLE_MIN_LENGTH: usize = 3;
/// Maximum session title length.
pub const TITLE_MAX_LENGTH: usize = 100;
/// Maximum session description length.
pub const DESCRIPTION_MAX_LENGTH: usize = 500;
/// Minimum question length, shared by every submission path.
pub const QUESTION_MIN_LENGTH: usize = 3;
/// Maximum question length.
pub const QUESTION_MAX_LENGTH: usize = 500;
/// Maximum author display name length.
pub const AUTHOR_NAME_MAX_LENGTH: usize = 100;

fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn failure(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    match trimmed_len(title) {
        0 => Err(failure("required", "Title is required")),
        n if n < TITLE_MIN_LENGTH => Err(failure(
            "too_short",
            format!("Title must be at least {TITLE_MIN_LENGTH} characters"),
        )),
        n if n > TITLE_MAX_LENGTH => Err(failure(
            "too_long",
            format!("Title must be no more than {TITLE_MAX_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if trimmed_len(description) > DESCRIPTION_MAX_LENGTH {
        return Err(failure(
            "too_long",
            format!("Description must be no more than {DESCRIPTION_MAX_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn check_content(content: &str) -> Result<(), ValidationError> {
    match trimmed_len(content) {
        0 => Err(failure("required", "Question content is required")),
        n if n < QUESTION_MIN_LENGTH => Err(failure(
            "too_short",
            format!("Question must be at least {QUESTION_MIN_LENGTH} characters"),
        )),
        n if n > QUESTION_MAX_LENGTH => Err(failure(
            "too_long",
            format!("Question must be no more than {QUESTION_MAX_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

fn check_participant_id(participant_id: &str) -> Result<(), ValidationError> {
    if participant_id.trim().is_empty() {
        return Err(failure("required", "Participant ID is required"));
    }
    if !is_participant_id(participant_id) {
        return Err(failure("invalid", "Invalid participant ID"));
    }
    Ok(())
}

fn check_author_name(author_name: &str) -> Result<(), ValidationError> {
    if trimmed_len(author_name) > AUTHOR_NAME_MAX_LENGTH {
        return Err(failure(
            "too_long",
            format!("Author name must be no more than {AUTHOR_NAME_MAX_LENGTH} characters"),
        ));
    }
    Ok(())
}

#[derive(Debug, Validate)]
struct SessionFields {
    #[validate(custom(function = "check_title"))]
    title: String,
    #[validate(custom(function = "check_description"))]
    description: Option<String>,
}

#[derive(Debug, Validate)]
struct QuestionFields {
    #[validate(custom(function = "check_content"))]
    content: String,
    #[validate(custom(function = "check_participant_id"))]
    participant_id: String,
    #[validate(custom(function = "check_author_name"))]
    author_name: Option<String>,
}

#[derive(Debug, Validate)]
struct ParticipantFields {
    #[validate(custom(function = "check_participant_id"))]
    participant_id: String,
}

/// Per-field messages for a session form. `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionInputErrors {
    /// Title problem, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description problem, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Outcome of [`validate_session_input`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidation {
    /// True when no field failed.
    pub is_valid: bool,
    /// Field messages.
    pub errors: SessionInputErrors,
}

impl SessionValidation {
    /// Flatten into the `(field, message)` list used by error responses.
    #[must_use]
    pub fn into_field_errors(self) -> Vec<FieldError> {
        let SessionInputErrors { title, description } = self.errors;
        title
            .map(|m| FieldError::new("title", m))
            .into_iter()
            .chain(description.map(|m| FieldError::new("description", m)))
            .collect()
    }
}

/// Outcome of [`validate_question_input`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionValidation {
    /// True when no field failed.
    pub is_valid: bool,
    /// Failures in field order: content, participantId, authorName.
    pub errors: Vec<FieldError>,
}

fn first_message(errors: &ValidationErrors, field: &str) -> Option<String> {
    errors.field_errors().get(field).and_then(|errs| {
        errs.first().map(|e| {
            e.message
                .as_ref()
                .map_or_else(|| e.code.to_string(), ToString::to_string)
        })
    })
}

fn collect_in_order(
    result: Result<(), ValidationErrors>,
    fields: &[(&str, &str)],
) -> Vec<FieldError> {
    let Err(errors) = result else {
        return Vec::new();
    };
    fields
        .iter()
        .filter_map(|(name, api_name)| {
            first_message(&errors, name).map(|message| FieldError::new(*api_name, message))
        })
        .collect()
}

/// Validate session creation fields.
#[must_use]
pub fn validate_session_input(title: &str, description: Option<&str>) -> SessionValidation {
    let fields = SessionFields {
        title: title.to_string(),
        description: description.map(ToString::to_string),
    };

    let errors = match fields.validate() {
        Ok(()) => SessionInputErrors::default(),
        Err(errors) => SessionInputErrors {
            title: first_message(&errors, "title"),
            description: first_message(&errors, "description"),
        },
    };

    SessionValidation {
        is_valid: errors.title.is_none() && errors.description.is_none(),
        errors,
    }
}

/// Validate question submission fields.
#[must_use]
pub fn validate_question_input(
    content: &str,
    participant_id: &str,
    author_name: Option<&str>,
) -> QuestionValidation {
    let fields = QuestionFields {
        content: content.to_string(),
        participant_id: participant_id.to_string(),
        author_name: author_name.map(ToString::to_string),
    };

    let errors = collect_in_order(
        fields.validate(),
        &[
            ("content", "content"),
            ("participant_id", "participantId"),
            ("author_name", "authorName"),
        ],
    );

    QuestionValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Validate a bare participant identifier (vote and feedback paths).
pub fn validate_participant_id(participant_id: &str) -> Result<(), Vec<FieldError>> {
    let fields = ParticipantFields {
        participant_id: participant_id.to_string(),
    };
    let errors = collect_in_order(fields.validate(), &[("participant_id", "participantId")]);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
