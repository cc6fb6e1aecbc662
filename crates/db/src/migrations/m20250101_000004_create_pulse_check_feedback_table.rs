//! Create `pulse_check_feedback` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PulseCheckFeedback::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PulseCheckFeedback::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PulseCheckFeedback::QuestionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PulseCheckFeedback::ParticipantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PulseCheckFeedback::Feedback)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PulseCheckFeedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pulse_check_feedback_question")
                            .from(PulseCheckFeedback::Table, PulseCheckFeedback::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pulse_check_feedback_question_participant")
                    .table(PulseCheckFeedback::Table)
                    .col(PulseCheckFeedback::QuestionId)
                    .col(PulseCheckFeedback::ParticipantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PulseCheckFeedback::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PulseCheckFeedback {
    Table,
    Id,
    QuestionId,
    ParticipantId,
    Feedback,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Question {
    Table,
    Id,
}
