#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::{DatabaseConnection, TransactionTrait};

use models::db::{connect_with_config, in_memory_config, DatabaseConfig};
use models::{membership, organization, user, Money, Role};

use crate::authz::TenantContext;
use crate::catalog::{Catalog, ProductInput};

/// Fresh in-memory database per test, schema applied.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&in_memory_config()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// File-backed database with a real connection pool, for tests that need
/// sales to interleave at the storage layer. Keep the `TempDir` alive for the
/// duration of the test.
pub async fn get_pooled_db(max_connections: u32) -> Result<(tempfile::TempDir, DatabaseConnection), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("pos.db").display()),
        max_connections,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok((dir, db))
}

/// Owner account with its own store, as registration would create it.
pub async fn register_owner(db: &DatabaseConnection, name: &str, login: &str) -> Result<TenantContext, anyhow::Error> {
    let txn = db.begin().await?;
    let org = organization::create(&txn, &organization::store_name_for(name)).await?;
    let u = user::create(&txn, name, login, Some(org.id)).await?;
    membership::create(&txn, org.id, u.id, Role::Owner).await?;
    txn.commit().await?;
    Ok(TenantContext { user_id: u.id, organization_id: org.id, role: Role::Owner })
}

pub async fn add_member(
    db: &DatabaseConnection,
    organization_id: uuid::Uuid,
    name: &str,
    login: &str,
    role: Role,
) -> Result<TenantContext, anyhow::Error> {
    let u = user::create(db, name, login, Some(organization_id)).await?;
    membership::create(db, organization_id, u.id, role).await?;
    Ok(TenantContext { user_id: u.id, organization_id, role })
}

pub async fn add_product(
    db: &DatabaseConnection,
    ctx: &TenantContext,
    name: &str,
    cents: i64,
    sku: Option<&str>,
    stock: i32,
) -> Result<models::product::Model, anyhow::Error> {
    let input = ProductInput {
        name: name.into(),
        price: Money::from_cents(cents),
        sku: sku.map(str::to_string),
        stock_quantity: stock,
    };
    Ok(Catalog::new(db.clone()).create(ctx, input).await?)
}
