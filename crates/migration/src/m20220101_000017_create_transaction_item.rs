//! Create `transaction_item` table.
//!
//! `product_id` deliberately carries no FK so catalog deletes never touch history.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransactionItem::Table)
                    .if_not_exists()
                    .col(uuid(TransactionItem::Id).primary_key())
                    .col(uuid(TransactionItem::TransactionId).not_null())
                    .col(uuid(TransactionItem::ProductId).not_null())
                    .col(integer(TransactionItem::LineNo).not_null())
                    .col(integer(TransactionItem::Quantity).not_null())
                    .col(big_integer(TransactionItem::PriceAtTransaction).not_null())
                    .col(timestamp_with_time_zone(TransactionItem::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(TransactionItem::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_item_transaction")
                            .from(TransactionItem::Table, TransactionItem::TransactionId)
                            .to(Transaction::Table, Transaction::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TransactionItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TransactionItem {
    Table,
    Id,
    TransactionId,
    ProductId,
    LineNo,
    Quantity,
    PriceAtTransaction,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transaction { Table, Id }
