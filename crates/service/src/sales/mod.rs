//! Sale recording: the transactional core.
//!
//! A sale moves `Received -> Validated -> Persisted -> StockAdjusted ->
//! Committed`. Header, line items and stock decrements share one storage
//! transaction; any failure rolls all of it back.

pub mod domain;
pub mod errors;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use configs::StockPolicy;
use models::{product, transaction, transaction_item, Money};

use crate::{authz::TenantContext, errors::ServiceError, pagination::Pagination};

pub use domain::{SaleHeader, SaleLine, SalesPolicy, TransactionItemView};
pub use errors::{SaleError, SaleStage};

/// Upper bound on lines per sale.
pub const MAX_CART_LINES: usize = 1000;

struct PricedLine {
    line_no: i32,
    product_id: Uuid,
    quantity: i32,
    unit_price: Money,
}

/// Cart shape checks that need no storage: non-empty, bounded length,
/// positive 32-bit quantities.
fn check_quantities(lines: &[SaleLine]) -> Result<Vec<i32>, SaleError> {
    if lines.is_empty() {
        return Err(SaleError::EmptyCart);
    }
    if lines.len() > MAX_CART_LINES {
        return Err(SaleError::CartTooLarge { lines: lines.len(), max: MAX_CART_LINES });
    }
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            i32::try_from(line.quantity)
                .ok()
                .filter(|q| *q > 0)
                .ok_or(SaleError::InvalidQuantity { line_no: idx + 1, quantity: line.quantity })
        })
        .collect()
}

/// Sum quantities per product. Iteration is ordered by id so concurrent sales
/// touch product rows in the same order.
fn quantities_by_product(lines: impl IntoIterator<Item = (Uuid, i32)>) -> BTreeMap<Uuid, i64> {
    let mut per_product = BTreeMap::new();
    for (product_id, qty) in lines {
        *per_product.entry(product_id).or_insert(0i64) += i64::from(qty);
    }
    per_product
}

async fn finish<T>(txn: DatabaseTransaction, result: Result<T, SaleError>) -> Result<T, SaleError> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(SaleError::storage(SaleStage::Committed))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rb) = txn.rollback().await {
                error!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}

#[derive(Clone)]
pub struct SaleRecorder {
    db: DatabaseConnection,
    policy: SalesPolicy,
}

impl SaleRecorder {
    pub fn new(db: DatabaseConnection, policy: SalesPolicy) -> Self { Self { db, policy } }

    pub fn policy(&self) -> SalesPolicy { self.policy }

    /// Record a sale for the caller's organization and return the new
    /// transaction id.
    #[instrument(
        skip(self, ctx, header, lines),
        fields(organization_id = %ctx.organization_id, user_id = %ctx.user_id, lines = lines.len())
    )]
    pub async fn record_sale(&self, ctx: &TenantContext, header: SaleHeader, lines: Vec<SaleLine>) -> Result<Uuid, SaleError> {
        debug!(stage = %SaleStage::Received, "sale_stage");
        let result = match check_quantities(&lines) {
            Ok(quantities) => {
                let txn = self.db.begin().await.map_err(SaleError::storage(SaleStage::Received))?;
                let applied = self.apply_sale(&txn, ctx, &header, &lines, &quantities).await;
                finish(txn, applied).await
            }
            Err(e) => Err(e),
        };
        match &result {
            Ok(id) => info!(transaction_id = %id, stage = %SaleStage::Committed, "sale_recorded"),
            Err(e) => warn!(stage = %SaleStage::Failed, code = e.code(), error = %e, "sale_failed"),
        }
        result
    }

    async fn apply_sale(
        &self,
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        header: &SaleHeader,
        lines: &[SaleLine],
        quantities: &[i32],
    ) -> Result<Uuid, SaleError> {
        let ids: BTreeSet<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let products: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::OrganizationId.eq(ctx.organization_id))
            .filter(product::Column::Id.is_in(ids))
            .all(txn)
            .await
            .map_err(SaleError::storage(SaleStage::Received))?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut priced = Vec::with_capacity(lines.len());
        let mut total = Money::ZERO;
        for (idx, (line, &quantity)) in lines.iter().zip(quantities).enumerate() {
            let line_no = idx + 1;
            let product = products
                .get(&line.product_id)
                .ok_or(SaleError::UnknownProduct { product_id: line.product_id })?;
            let unit_price = line.price_at_transaction.unwrap_or(product.price);
            if unit_price.is_negative() {
                return Err(SaleError::InvalidPrice { line_no });
            }
            total = unit_price
                .checked_mul(i64::from(quantity))
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or(SaleError::InvalidPrice { line_no })?;
            let line_no = i32::try_from(line_no)
                .map_err(|_| SaleError::CartTooLarge { lines: lines.len(), max: MAX_CART_LINES })?;
            priced.push(PricedLine { line_no, product_id: line.product_id, quantity, unit_price });
        }

        if let Some(submitted) = header.total_amount {
            if submitted.abs_diff(total) > self.policy.total_tolerance.cents().unsigned_abs() {
                return Err(SaleError::TotalMismatch { submitted, computed: total });
            }
        }
        let change = header
            .amount_received
            .checked_sub(total)
            .filter(|c| !c.is_negative())
            .ok_or(SaleError::InsufficientPayment { total, received: header.amount_received })?;
        debug!(stage = %SaleStage::Validated, total = %total, change = %change, "sale_stage");

        let now: DateTimeWithTimeZone = Utc::now().into();
        let transaction_id = Uuid::new_v4();
        transaction::ActiveModel {
            id: Set(transaction_id),
            organization_id: Set(ctx.organization_id),
            user_id: Set(ctx.user_id),
            total_amount: Set(total),
            amount_received: Set(header.amount_received),
            change: Set(change),
            transaction_date: Set(header.transaction_date.unwrap_or_else(Utc::now).into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(SaleError::storage(SaleStage::Persisted))?;

        let items = priced.iter().map(|l| transaction_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            product_id: Set(l.product_id),
            line_no: Set(l.line_no),
            quantity: Set(l.quantity),
            price_at_transaction: Set(l.unit_price),
            created_at: Set(now),
            updated_at: Set(now),
        });
        transaction_item::Entity::insert_many(items)
            .exec(txn)
            .await
            .map_err(SaleError::storage(SaleStage::Persisted))?;
        debug!(stage = %SaleStage::Persisted, %transaction_id, "sale_stage");

        for (product_id, requested) in quantities_by_product(priced.iter().map(|l| (l.product_id, l.quantity))) {
            let mut update = product::Entity::update_many()
                .col_expr(product::Column::StockQuantity, Expr::col(product::Column::StockQuantity).sub(requested))
                .col_expr(product::Column::UpdatedAt, Expr::value(now))
                .filter(product::Column::Id.eq(product_id))
                .filter(product::Column::OrganizationId.eq(ctx.organization_id));
            if self.policy.stock_policy == StockPolicy::Reject {
                update = update.filter(product::Column::StockQuantity.gte(requested));
            }
            let res = update.exec(txn).await.map_err(SaleError::storage(SaleStage::StockAdjusted))?;
            if res.rows_affected == 0 {
                return Err(SaleError::InsufficientStock { product_id, requested });
            }
        }
        debug!(stage = %SaleStage::StockAdjusted, %transaction_id, "sale_stage");
        Ok(transaction_id)
    }

    /// Newest first by transaction date.
    pub async fn list_transactions(
        &self,
        ctx: &TenantContext,
        page: Option<Pagination>,
    ) -> Result<Vec<transaction::Model>, ServiceError> {
        let query = transaction::Entity::find()
            .filter(transaction::Column::OrganizationId.eq(ctx.organization_id))
            .order_by_desc(transaction::Column::TransactionDate)
            .order_by_desc(transaction::Column::CreatedAt);
        let rows = match page {
            Some(p) => {
                let (page_idx, per_page) = p.normalize();
                query.paginate(&self.db, per_page).fetch_page(page_idx).await?
            }
            None => query.all(&self.db).await?,
        };
        Ok(rows)
    }

    pub async fn get_transaction(&self, ctx: &TenantContext, id: Uuid) -> Result<transaction::Model, ServiceError> {
        transaction::Entity::find_by_id(id)
            .filter(transaction::Column::OrganizationId.eq(ctx.organization_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("transaction"))
    }

    /// Line items in cart order with product names for display.
    pub async fn get_transaction_items(&self, ctx: &TenantContext, id: Uuid) -> Result<Vec<TransactionItemView>, ServiceError> {
        self.get_transaction(ctx, id).await?;
        let rows = transaction_item::Entity::find()
            .filter(transaction_item::Column::TransactionId.eq(id))
            .order_by_asc(transaction_item::Column::LineNo)
            .find_also_related(product::Entity)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(item, product)| TransactionItemView {
                id: item.id,
                transaction_id: item.transaction_id,
                product_id: item.product_id,
                line_no: item.line_no,
                quantity: item.quantity,
                price_at_transaction: item.price_at_transaction,
                product_name: product.map(|p| p.name).unwrap_or_default(),
                created_at: item.created_at.with_timezone(&Utc),
                updated_at: item.updated_at.with_timezone(&Utc),
            })
            .collect())
    }

    /// Delete a transaction and return its quantities to stock, atomically.
    #[instrument(skip(self, ctx), fields(organization_id = %ctx.organization_id))]
    pub async fn delete_transaction(&self, ctx: &TenantContext, id: Uuid) -> Result<(), SaleError> {
        let txn = self.db.begin().await.map_err(SaleError::storage(SaleStage::Received))?;
        let deleted = async {
            let header = transaction::Entity::find_by_id(id)
                .filter(transaction::Column::OrganizationId.eq(ctx.organization_id))
                .one(&txn)
                .await
                .map_err(SaleError::storage(SaleStage::Received))?
                .ok_or(SaleError::NotFound)?;
            let items = transaction_item::Entity::find()
                .filter(transaction_item::Column::TransactionId.eq(header.id))
                .all(&txn)
                .await
                .map_err(SaleError::storage(SaleStage::Received))?;

            let now: DateTimeWithTimeZone = Utc::now().into();
            for (product_id, qty) in quantities_by_product(items.iter().map(|i| (i.product_id, i.quantity))) {
                // Zero rows is fine: the product may have been deleted since.
                product::Entity::update_many()
                    .col_expr(product::Column::StockQuantity, Expr::col(product::Column::StockQuantity).add(qty))
                    .col_expr(product::Column::UpdatedAt, Expr::value(now))
                    .filter(product::Column::Id.eq(product_id))
                    .filter(product::Column::OrganizationId.eq(ctx.organization_id))
                    .exec(&txn)
                    .await
                    .map_err(SaleError::storage(SaleStage::StockAdjusted))?;
            }
            transaction_item::Entity::delete_many()
                .filter(transaction_item::Column::TransactionId.eq(header.id))
                .exec(&txn)
                .await
                .map_err(SaleError::storage(SaleStage::Persisted))?;
            transaction::Entity::delete_by_id(header.id)
                .exec(&txn)
                .await
                .map_err(SaleError::storage(SaleStage::Persisted))?;
            Ok::<_, SaleError>(items.len())
        }
        .await;
        let restored_lines = finish(txn, deleted).await?;
        info!(transaction_id = %id, restored_lines, "transaction_deleted");
        Ok(())
    }
}
