use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Membership: lookups by user for tenant resolution
        manager
            .create_index(
                Index::create()
                    .name("idx_organization_user_user")
                    .table(OrganizationUser::Table)
                    .col(OrganizationUser::UserId)
                    .to_owned(),
            )
            .await?;

        // Product: per-organization catalog scans
        manager
            .create_index(
                Index::create()
                    .name("idx_product_organization")
                    .table(Product::Table)
                    .col(Product::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // Product: SKU unique within an organization (NULLs never collide)
        manager
            .create_index(
                Index::create()
                    .name("uniq_product_organization_sku")
                    .table(Product::Table)
                    .col(Product::OrganizationId)
                    .col(Product::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Transaction: listing by date within an organization
        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_organization_date")
                    .table(Transaction::Table)
                    .col(Transaction::OrganizationId)
                    .col(Transaction::TransactionDate)
                    .to_owned(),
            )
            .await?;

        // TransactionItem: by parent and by product
        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_item_transaction")
                    .table(TransactionItem::Table)
                    .col(TransactionItem::TransactionId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_item_product")
                    .table(TransactionItem::Table)
                    .col(TransactionItem::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_organization_user_user").table(OrganizationUser::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_organization").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_product_organization_sku").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_transaction_organization_date").table(Transaction::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_transaction_item_transaction").table(TransactionItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_transaction_item_product").table(TransactionItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrganizationUser { Table, UserId }

#[derive(DeriveIden)]
enum Product { Table, OrganizationId, Sku }

#[derive(DeriveIden)]
enum Transaction { Table, OrganizationId, TransactionDate }

#[derive(DeriveIden)]
enum TransactionItem { Table, TransactionId, ProductId }
