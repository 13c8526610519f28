//! Create `setting` table keyed by (organization, user, key).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Setting::Table)
                    .if_not_exists()
                    .col(uuid(Setting::OrganizationId).not_null())
                    .col(uuid(Setting::UserId).not_null())
                    .col(string_len(Setting::Key, 64).not_null())
                    .col(text(Setting::Value).not_null())
                    .col(timestamp_with_time_zone(Setting::UpdatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .col(Setting::OrganizationId)
                            .col(Setting::UserId)
                            .col(Setting::Key),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_setting_organization")
                            .from(Setting::Table, Setting::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_setting_user")
                            .from(Setting::Table, Setting::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Setting::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Setting { Table, OrganizationId, UserId, Key, Value, UpdatedAt }

#[derive(DeriveIden)]
enum Organization { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
