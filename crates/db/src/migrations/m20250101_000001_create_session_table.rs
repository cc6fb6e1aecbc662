//! Create session table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Session::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Session::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Session::Code).string_len(6).not_null())
                    .col(ColumnDef::new(Session::HostId).string_len(128).not_null())
                    .col(ColumnDef::new(Session::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Session::Description).text())
                    .col(
                        ColumnDef::new(Session::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Session::IsAcceptingQuestions)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Session::ModerationEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Session::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Session::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Session::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // The storage-side authority on code uniqueness
        manager
            .create_index(
                Index::create()
                    .name("idx_session_code")
                    .table(Session::Table)
                    .col(Session::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_host_id")
                    .table(Session::Table)
                    .col(Session::HostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Session::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Session {
    Table,
    Id,
    Code,
    HostId,
    Title,
    Description,
    IsActive,
    IsAcceptingQuestions,
    ModerationEnabled,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}
