//! Create `organization_user` table: user x organization with role and active flag.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganizationUser::Table)
                    .if_not_exists()
                    .col(uuid(OrganizationUser::OrganizationId).not_null())
                    .col(uuid(OrganizationUser::UserId).not_null())
                    .col(string_len(OrganizationUser::Role, 16).not_null())
                    .col(boolean(OrganizationUser::IsActive).not_null())
                    .col(timestamp_with_time_zone(OrganizationUser::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(OrganizationUser::UpdatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .col(OrganizationUser::OrganizationId)
                            .col(OrganizationUser::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_user_organization")
                            .from(OrganizationUser::Table, OrganizationUser::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_user_user")
                            .from(OrganizationUser::Table, OrganizationUser::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrganizationUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OrganizationUser { Table, OrganizationId, UserId, Role, IsActive, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Organization { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
