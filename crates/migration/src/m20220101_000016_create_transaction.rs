//! Create `transaction` table: one row per recorded sale.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transaction::Table)
                    .if_not_exists()
                    .col(uuid(Transaction::Id).primary_key())
                    .col(uuid(Transaction::OrganizationId).not_null())
                    .col(uuid(Transaction::UserId).not_null())
                    .col(big_integer(Transaction::TotalAmount).not_null())
                    .col(big_integer(Transaction::AmountReceived).not_null())
                    .col(big_integer(Transaction::Change).not_null())
                    .col(timestamp_with_time_zone(Transaction::TransactionDate).not_null())
                    .col(timestamp_with_time_zone(Transaction::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Transaction::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_organization")
                            .from(Transaction::Table, Transaction::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_user")
                            .from(Transaction::Table, Transaction::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transaction::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transaction {
    Table,
    Id,
    OrganizationId,
    UserId,
    TotalAmount,
    AmountReceived,
    Change,
    TransactionDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organization { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
