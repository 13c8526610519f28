//! Tenant-scoped product catalog.
//!
//! Every query filters on the caller's organization, so a product id owned by
//! another tenant behaves exactly like an id that does not exist.

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{product, Money};

use crate::{authz::TenantContext, errors::ServiceError};

/// Full product state as supplied by a client on create or update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
}

struct ValidProduct {
    name: String,
    price: Money,
    sku: Option<String>,
    stock_quantity: i32,
}

impl ProductInput {
    fn validate(self) -> Result<ValidProduct, ServiceError> {
        product::validate_name(&self.name)?;
        product::validate_price(self.price)?;
        let sku = product::normalize_sku(self.sku.as_deref())?;
        if self.stock_quantity < 0 {
            return Err(ServiceError::Validation("stock_quantity must not be negative".into()));
        }
        Ok(ValidProduct { name: self.name.trim().to_string(), price: self.price, sku, stock_quantity: self.stock_quantity })
    }
}

fn map_write_err(e: sea_orm::DbErr) -> ServiceError {
    if models::errors::is_unique_violation(&e) {
        ServiceError::Conflict("sku already used in this organization".into())
    } else {
        ServiceError::Db(e.to_string())
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(q: &str) -> String {
    let mut out = String::with_capacity(q.len());
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::OrganizationId.eq(ctx.organization_id))
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Case-insensitive substring match on name or SKU.
    pub async fn search(&self, ctx: &TenantContext, query: &str) -> Result<Vec<product::Model>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(ctx).await;
        }
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let matches = Condition::any()
            .add(Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(LikeExpr::new(pattern.clone()).escape('\\')))
            .add(Expr::expr(Func::lower(Expr::col(product::Column::Sku))).like(LikeExpr::new(pattern).escape('\\')));
        Ok(product::Entity::find()
            .filter(product::Column::OrganizationId.eq(ctx.organization_id))
            .filter(matches)
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .filter(product::Column::OrganizationId.eq(ctx.organization_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    #[instrument(skip(self, ctx, input), fields(organization_id = %ctx.organization_id))]
    pub async fn create(&self, ctx: &TenantContext, input: ProductInput) -> Result<product::Model, ServiceError> {
        let p = input.validate()?;
        let now = Utc::now().into();
        let am = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(ctx.organization_id),
            user_id: Set(ctx.user_id),
            name: Set(p.name),
            price: Set(p.price),
            sku: Set(p.sku),
            stock_quantity: Set(p.stock_quantity),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&self.db).await.map_err(map_write_err)?;
        info!(product_id = %created.id, "product_created");
        Ok(created)
    }

    /// Full replacement of name, price, SKU and stock.
    #[instrument(skip(self, ctx, input), fields(organization_id = %ctx.organization_id))]
    pub async fn update(&self, ctx: &TenantContext, id: Uuid, input: ProductInput) -> Result<product::Model, ServiceError> {
        let p = input.validate()?;
        let mut am: product::ActiveModel = self.get(ctx, id).await?.into();
        am.name = Set(p.name);
        am.price = Set(p.price);
        am.sku = Set(p.sku);
        am.stock_quantity = Set(p.stock_quantity);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await.map_err(map_write_err)?;
        info!(product_id = %updated.id, "product_updated");
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(organization_id = %ctx.organization_id))]
    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), ServiceError> {
        let res = product::Entity::delete_many()
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::OrganizationId.eq(ctx.organization_id))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("product"));
        }
        info!(product_id = %id, "product_deleted");
        Ok(())
    }
}
