//! Demo data for a fresh installation.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use configs::SeedConfig;
use models::{user, Money, Role};

use crate::{
    auth::{domain::RegisterInput, repository::AuthRepository, AuthService},
    authz::TenantContext,
    catalog::{Catalog, ProductInput},
    sales::{SaleHeader, SaleLine, SaleRecorder},
    settings_service,
};

pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("printer_type", "Bluetooth"),
    ("business_name", "My Business"),
    ("receipt_footer", "Thank you for your purchase!"),
    ("use_inventory_tracking", "true"),
    ("use_sku_field", "true"),
];

const SAMPLE_PRODUCTS: &[(&str, i64, &str, i32)] = &[
    ("Coffee Beans 1kg", 1550, "SKU-1001", 100),
    ("Milk 1L", 120, "SKU-1002", 200),
    ("Sugar 500g", 80, "SKU-1003", 150),
];

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub admin_user_id: Uuid,
    pub organization_id: Uuid,
    pub product_ids: Vec<Uuid>,
    pub transaction_id: Uuid,
}

/// Populate an empty database. Returns `None` when seeding is disabled or
/// any user already exists.
#[instrument(skip_all, fields(enabled = cfg.enabled))]
pub async fn run<R: AuthRepository>(
    db: &DatabaseConnection,
    cfg: &SeedConfig,
    auth: &AuthService<R>,
    sales: &SaleRecorder,
) -> anyhow::Result<Option<SeedReport>> {
    if !cfg.enabled {
        return Ok(None);
    }
    if user::Entity::find().count(db).await? > 0 {
        info!("users present, skipping seed");
        return Ok(None);
    }

    let owner = auth
        .register(RegisterInput { name: "Admin".into(), login: cfg.admin_login.clone(), password: cfg.admin_password.clone() })
        .await?;
    let ctx = TenantContext { user_id: owner.user.id, organization_id: owner.organization_id, role: Role::Owner };

    for (key, value) in DEFAULT_SETTINGS {
        settings_service::put(db, &ctx, key, value).await?;
    }

    let catalog = Catalog::new(db.clone());
    let mut product_ids = Vec::with_capacity(SAMPLE_PRODUCTS.len());
    for (name, cents, sku, stock) in SAMPLE_PRODUCTS {
        let input = ProductInput {
            name: (*name).into(),
            price: Money::from_cents(*cents),
            sku: Some((*sku).into()),
            stock_quantity: *stock,
        };
        product_ids.push(catalog.create(&ctx, input).await?.id);
    }

    let lines = vec![
        SaleLine { product_id: product_ids[0], quantity: 1, price_at_transaction: None },
        SaleLine { product_id: product_ids[1], quantity: 2, price_at_transaction: None },
    ];
    let header = SaleHeader { amount_received: Money::from_cents(2000), transaction_date: None, total_amount: None };
    let transaction_id = sales.record_sale(&ctx, header, lines).await?;

    info!(admin_user_id = %ctx.user_id, organization_id = %ctx.organization_id, "seed_complete");
    Ok(Some(SeedReport { admin_user_id: ctx.user_id, organization_id: ctx.organization_id, product_ids, transaction_id }))
}
