//! Question entity for participant submissions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation status of a question. Exactly one at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    /// Waiting for host approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Visible to participants.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Hidden by the host.
    #[sea_orm(string_value = "dismissed")]
    Dismissed,
    /// Currently being answered on stage.
    #[sea_orm(string_value = "being_answered")]
    BeingAnswered,
    /// Answered; open for pulse-check feedback.
    #[sea_orm(string_value = "answered")]
    Answered,
}

impl QuestionStatus {
    /// Statuses a participant is allowed to see.
    pub const PARTICIPANT_VISIBLE: [Self; 3] =
        [Self::Approved, Self::BeingAnswered, Self::Answered];

    /// Whether participants can see a question in this status.
    #[must_use]
    pub fn is_participant_visible(self) -> bool {
        Self::PARTICIPANT_VISIBLE.contains(&self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub session_id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Display name the participant chose, absent for anonymous questions.
    #[sea_orm(nullable)]
    pub author_name: Option<String>,

    /// Client-held identifier of the submitting participant.
    pub participant_id: String,

    pub status: QuestionStatus,

    /// Number of vote rows (denormalized, adjusted in place on every vote change).
    #[sea_orm(default_value = 0)]
    pub vote_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionId",
        to = "super::session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,

    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,

    #[sea_orm(has_many = "super::pulse_check_feedback::Entity")]
    PulseCheckFeedback,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl Related<super::pulse_check_feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PulseCheckFeedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
