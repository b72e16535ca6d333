use sea_orm_migration::{prelude::*, schema::*};

use super::m20241001_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventLog::Table)
                    .if_not_exists()
                    .col(pk_auto(EventLog::Id))
                    .col(string_len(EventLog::CaseId, 255).not_null())
                    .col(string_len(EventLog::Activity, 255).not_null())
                    .col(timestamp_with_time_zone(EventLog::StartTime).not_null())
                    .col(timestamp_with_time_zone_null(EventLog::EndTime))
                    .col(uuid_null(EventLog::UserId))
                    .col(string_len(EventLog::UserName, 255).not_null())
                    .col(integer_null(EventLog::StatusCode))
                    // Audit rows outlive the users they mention.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_log_user")
                            .from(EventLog::Table, EventLog::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_log_case_start")
                    .table(EventLog::Table)
                    .col(EventLog::CaseId)
                    .col(EventLog::StartTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum EventLog {
    Table,
    Id,
    CaseId,
    Activity,
    StartTime,
    EndTime,
    UserId,
    UserName,
    StatusCode,
}
