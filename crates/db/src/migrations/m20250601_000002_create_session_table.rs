//! Create session table migration.

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
                    .col(ColumnDef::new(Session::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Session::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Session::Nonce).binary().not_null())
                    .col(
                        ColumnDef::new(Session::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: nonce (the token lookup key)
        manager
            .create_index(
                Index::create()
                    .name("idx_session_nonce")
                    .table(Session::Table)
                    .col(Session::Nonce)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: owner (destroy-all on account deletion)
        manager
            .create_index(
                Index::create()
                    .name("idx_session_owner_id")
                    .table(Session::Table)
                    .col(Session::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Index: expires_at (the background reaper's scan)
        manager
            .create_index(
                Index::create()
                    .name("idx_session_expires_at")
                    .table(Session::Table)
                    .col(Session::ExpiresAt)
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

#[derive(Iden)]
enum Session {
    Table,
    Id,
    OwnerId,
    Nonce,
    ExpiresAt,
}
