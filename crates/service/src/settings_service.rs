//! Per-user, per-organization key/value settings.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{info, instrument};

use models::setting;

use crate::{authz::TenantContext, errors::ServiceError};

pub async fn get(db: &DatabaseConnection, ctx: &TenantContext, key: &str) -> Result<Option<String>, ServiceError> {
    setting::validate_key(key)?;
    let found = setting::Entity::find_by_id((ctx.organization_id, ctx.user_id, key.trim().to_string()))
        .one(db)
        .await?;
    Ok(found.map(|s| s.value))
}

/// Insert or overwrite the value stored under `key`.
#[instrument(skip(db, ctx, value), fields(organization_id = %ctx.organization_id, user_id = %ctx.user_id))]
pub async fn put(db: &DatabaseConnection, ctx: &TenantContext, key: &str, value: &str) -> Result<setting::Model, ServiceError> {
    setting::validate_key(key)?;
    let key = key.trim().to_string();
    let now = Utc::now().into();
    let existing = setting::Entity::find_by_id((ctx.organization_id, ctx.user_id, key.clone()))
        .one(db)
        .await?;
    let saved = match existing {
        Some(found) => {
            let mut am: setting::ActiveModel = found.into();
            am.value = Set(value.to_string());
            am.updated_at = Set(now);
            am.update(db).await?
        }
        None => {
            setting::ActiveModel {
                organization_id: Set(ctx.organization_id),
                user_id: Set(ctx.user_id),
                key: Set(key),
                value: Set(value.to_string()),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };
    info!(key = %saved.key, "setting_saved");
    Ok(saved)
}
