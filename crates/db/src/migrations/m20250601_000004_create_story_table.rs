//! Create story table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Story::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Story::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Story::PrettyId).big_integer().not_null())
                    .col(ColumnDef::new(Story::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Story::Title).string_len(140).not_null())
                    .col(ColumnDef::new(Story::Narrative).text().not_null())
                    .col(ColumnDef::new(Story::QuestionId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Story::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: pretty_id (the public lookup key)
        manager
            .create_index(
                Index::create()
                    .name("idx_story_pretty_id")
                    .table(Story::Table)
                    .col(Story::PrettyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: created_at (feed ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_story_created_at")
                    .table(Story::Table)
                    .col(Story::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Story::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Story {
    Table,
    Id,
    PrettyId,
    AuthorId,
    Title,
    Narrative,
    QuestionId,
    CreatedAt,
}
