//! Create event table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::Description).text().not_null())
                    .col(ColumnDef::new(Event::Category).string_len(128).not_null())
                    .col(ColumnDef::new(Event::Location).string_len(256).not_null())
                    .col(ColumnDef::new(Event::Cost).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Event::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Event::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Event::EventLink).string_len(1024))
                    .col(ColumnDef::new(Event::CreatorId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Event::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Event::Canceled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_creator")
                            .from(Event::Table, Event::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: category (suggestion engine filters by category)
        manager
            .create_index(
                Index::create()
                    .name("idx_event_category")
                    .table(Event::Table)
                    .col(Event::Category)
                    .to_owned(),
            )
            .await?;

        // Index: creator_id
        manager
            .create_index(
                Index::create()
                    .name("idx_event_creator_id")
                    .table(Event::Table)
                    .col(Event::CreatorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    Description,
    Category,
    Location,
    Cost,
    StartTime,
    EndTime,
    EventLink,
    CreatorId,
    UpdatedAt,
    Canceled,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
