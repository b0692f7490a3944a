//! Create vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vote::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Vote::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::Answer).integer().not_null())
                    .col(ColumnDef::new(Vote::StoryPrettyId).big_integer().not_null())
                    .col(ColumnDef::new(Vote::IsLatest).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user, question, is_latest); active-vote lookup and
        // deactivation both filter on this triple.
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_user_question_latest")
                    .table(Vote::Table)
                    .col(Vote::UserId)
                    .col(Vote::QuestionId)
                    .col(Vote::IsLatest)
                    .to_owned(),
            )
            .await?;

        // Index: (question, is_latest) for counting
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_question_latest")
                    .table(Vote::Table)
                    .col(Vote::QuestionId)
                    .col(Vote::IsLatest)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    UserId,
    QuestionId,
    Answer,
    StoryPrettyId,
    IsLatest,
    CreatedAt,
}
