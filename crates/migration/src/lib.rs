//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20220101_000011_create_organization;
mod m20220101_000012_create_user;
mod m20220101_000013_create_user_credentials;
mod m20220101_000014_create_membership;
mod m20220101_000015_create_product;
mod m20220101_000016_create_transaction;
mod m20220101_000017_create_transaction_item;
mod m20220101_000018_create_setting;
mod m20220101_000002_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000011_create_organization::Migration),
            Box::new(m20220101_000012_create_user::Migration),
            Box::new(m20220101_000013_create_user_credentials::Migration),
            Box::new(m20220101_000014_create_membership::Migration),
            Box::new(m20220101_000015_create_product::Migration),
            Box::new(m20220101_000016_create_transaction::Migration),
            Box::new(m20220101_000017_create_transaction_item::Migration),
            Box::new(m20220101_000018_create_setting::Migration),
            // Indexes should always be applied last
            Box::new(m20220101_000002_add_indexes::Migration),
        ]
    }
}
