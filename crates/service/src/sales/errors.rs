use std::fmt;

use models::Money;
use thiserror::Error;
use uuid::Uuid;

/// Where a sale is in its lifecycle. `Failed` is reachable from every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStage {
    Received,
    Validated,
    Persisted,
    StockAdjusted,
    Committed,
    Failed,
}

impl fmt::Display for SaleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaleStage::Received => "received",
            SaleStage::Validated => "validated",
            SaleStage::Persisted => "persisted",
            SaleStage::StockAdjusted => "stock_adjusted",
            SaleStage::Committed => "committed",
            SaleStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum SaleError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("cart has {lines} lines, at most {max} are allowed")]
    CartTooLarge { lines: usize, max: usize },
    #[error("unknown product {product_id}")]
    UnknownProduct { product_id: Uuid },
    #[error("line {line_no}: quantity {quantity} must be a positive integer")]
    InvalidQuantity { line_no: usize, quantity: i64 },
    #[error("line {line_no}: unit price must not be negative")]
    InvalidPrice { line_no: usize },
    #[error("submitted total {submitted} does not match computed total {computed}")]
    TotalMismatch { submitted: Money, computed: Money },
    #[error("amount received {received} is less than total {total}")]
    InsufficientPayment { total: Money, received: Money },
    #[error("insufficient stock for product {product_id} (requested {requested})")]
    InsufficientStock { product_id: Uuid, requested: i64 },
    #[error("transaction not found")]
    NotFound,
    #[error("storage failure at stage {stage}: {message}")]
    Storage { stage: SaleStage, message: String },
}

impl SaleError {
    pub(crate) fn storage(stage: SaleStage) -> impl FnOnce(sea_orm::DbErr) -> SaleError {
        move |e| SaleError::Storage { stage, message: e.to_string() }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            SaleError::EmptyCart => 3001,
            SaleError::UnknownProduct { .. } => 3002,
            SaleError::InvalidQuantity { .. } => 3003,
            SaleError::InvalidPrice { .. } => 3004,
            SaleError::TotalMismatch { .. } => 3005,
            SaleError::InsufficientPayment { .. } => 3006,
            SaleError::InsufficientStock { .. } => 3007,
            SaleError::NotFound => 3008,
            SaleError::CartTooLarge { .. } => 3009,
            SaleError::Storage { .. } => 3200,
        }
    }

    /// Failures detected before anything is written.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SaleError::NotFound | SaleError::Storage { .. })
    }
}
