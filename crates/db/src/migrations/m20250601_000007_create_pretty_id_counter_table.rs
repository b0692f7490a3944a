//! Create pretty-ID counter table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Zero or one rows; the allocator seeds it on first use.
        manager
            .create_table(
                Table::create()
                    .table(PrettyIdCounter::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrettyIdCounter::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PrettyIdCounter::Value).big_integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrettyIdCounter::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PrettyIdCounter {
    Table,
    Id,
    Value,
}
