use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, organization, Money};

pub const MAX_SKU_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub price: Money,
    pub sku: Option<String>,
    pub stock_quantity: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Organization,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organization => Entity::belongs_to(organization::Entity)
                .from(Column::OrganizationId)
                .to(organization::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("product name required".into())); }
    Ok(())
}

pub fn validate_price(price: Money) -> Result<(), errors::ModelError> {
    if price.is_negative() { return Err(errors::ModelError::Validation("price must not be negative".into())); }
    Ok(())
}

/// Trim a SKU; blank input is rejected rather than silently dropped.
pub fn normalize_sku(sku: Option<&str>) -> Result<Option<String>, errors::ModelError> {
    match sku.map(str::trim) {
        None => Ok(None),
        Some("") => Err(errors::ModelError::Validation("sku must not be blank".into())),
        Some(s) if s.chars().count() > MAX_SKU_LEN => {
            Err(errors::ModelError::Validation(format!("sku longer than {MAX_SKU_LEN} characters")))
        }
        Some(s) => Ok(Some(s.to_string())),
    }
}
