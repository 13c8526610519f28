use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use configs::StockPolicy;
use models::Money;

/// Header fields a client submits with a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleHeader {
    pub amount_received: Money,
    /// Business time of the sale; defaults to now.
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    /// Client-computed total, cross-checked against the server's.
    #[serde(default)]
    pub total_amount: Option<Money>,
}

/// One cart line as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleLine {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Explicit unit price; the catalog price applies when absent.
    #[serde(default)]
    pub price_at_transaction: Option<Money>,
}

#[derive(Debug, Clone, Copy)]
pub struct SalesPolicy {
    pub stock_policy: StockPolicy,
    pub total_tolerance: Money,
}

impl Default for SalesPolicy {
    fn default() -> Self {
        Self { stock_policy: StockPolicy::Reject, total_tolerance: Money::from_cents(1) }
    }
}

impl From<&configs::SalesConfig> for SalesPolicy {
    fn from(cfg: &configs::SalesConfig) -> Self {
        Self { stock_policy: cfg.stock_policy, total_tolerance: Money::from_cents(cfg.total_tolerance_cents) }
    }
}

/// A line item joined with the product's current name.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionItemView {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub line_no: i32,
    pub quantity: i32,
    pub price_at_transaction: Money,
    /// Empty when the product has since been deleted.
    pub product_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
