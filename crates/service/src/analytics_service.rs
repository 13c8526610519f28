//! Dashboard aggregates over recorded sales.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Alias, Expr, Func, SimpleExpr},
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, Order, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use serde::Serialize;

use models::{product, transaction, transaction_item, Money};

use crate::{authz::TenantContext, errors::ServiceError};

pub const TOP_SELLING_LIMIT: u64 = 5;
pub const TOP_SELLING_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySummary {
    pub total_revenue: Money,
    pub total_transactions: u64,
    pub average_sale_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct TopProduct {
    pub name: String,
    pub quantity_sold: i64,
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_hms_opt(0, 0, 0).map(|d| d.and_utc()).unwrap_or(now)
}

/// Revenue, count and average over sales dated on the current UTC day.
pub async fn today_summary(db: &DatabaseConnection, ctx: &TenantContext, now: DateTime<Utc>) -> Result<TodaySummary, ServiceError> {
    let start = start_of_day(now);
    let end = start + Duration::days(1);
    let totals: Vec<Money> = transaction::Entity::find()
        .select_only()
        .column(transaction::Column::TotalAmount)
        .filter(transaction::Column::OrganizationId.eq(ctx.organization_id))
        .filter(transaction::Column::TransactionDate.gte(DateTimeWithTimeZone::from(start)))
        .filter(transaction::Column::TransactionDate.lt(DateTimeWithTimeZone::from(end)))
        .into_tuple()
        .all(db)
        .await?;

    let revenue = totals
        .iter()
        .try_fold(Money::ZERO, |acc, t| acc.checked_add(*t))
        .ok_or_else(|| ServiceError::Internal("revenue overflow".into()))?;
    let count = totals.len() as u64;
    let average = if count == 0 {
        Money::ZERO
    } else {
        Money::from_decimal((revenue.to_decimal() / Decimal::from(count)).round_dp(2))?
    };
    Ok(TodaySummary { total_revenue: revenue, total_transactions: count, average_sale_value: average })
}

/// Best sellers by quantity over the trailing window, grouped by product name.
pub async fn top_selling(db: &DatabaseConnection, ctx: &TenantContext, now: DateTime<Utc>) -> Result<Vec<TopProduct>, ServiceError> {
    let since = now - Duration::days(TOP_SELLING_WINDOW_DAYS);
    let quantity_sum = Expr::expr(Func::sum(Expr::col((transaction_item::Entity, transaction_item::Column::Quantity))))
        .cast_as(Alias::new("BIGINT"));
    Ok(transaction_item::Entity::find()
        .select_only()
        .column_as(product::Column::Name, "name")
        .column_as(quantity_sum, "quantity_sold")
        .join(JoinType::InnerJoin, transaction_item::Relation::Transaction.def())
        .join(JoinType::InnerJoin, transaction_item::Relation::Product.def())
        .filter(transaction::Column::OrganizationId.eq(ctx.organization_id))
        .filter(transaction::Column::TransactionDate.gte(DateTimeWithTimeZone::from(since)))
        .group_by(product::Column::Name)
        .order_by(SimpleExpr::from(Expr::col(Alias::new("quantity_sold"))), Order::Desc)
        .order_by_asc(product::Column::Name)
        .limit(TOP_SELLING_LIMIT)
        .into_model::<TopProduct>()
        .all(db)
        .await?)
}
