//! Tenant and role resolution.
//!
//! Every authorized request resolves the caller's organization and role from
//! storage. Nothing about tenancy is carried in the session token, so role or
//! membership edits apply on the very next call.

use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use models::{membership, user, Role};

/// Roles allowed to manage staff accounts.
pub const USER_ADMIN_ROLES: &[Role] = &[Role::Owner, Role::Manager];

/// The resolved scope an operation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
}

impl TenantContext {
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("user has no active organization")]
    NoActiveOrganization,
    #[error("user belongs to several organizations; select one first")]
    AmbiguousOrganization,
    #[error("user is not an active member of that organization")]
    NotAMember,
    #[error("role {0} is not allowed to perform this action")]
    Forbidden(Role),
    #[error("storage error: {0}")]
    Storage(String),
}

impl AuthzError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthzError::NoActiveOrganization => 4001,
            AuthzError::AmbiguousOrganization => 4002,
            AuthzError::NotAMember => 4003,
            AuthzError::Forbidden(_) => 4004,
            AuthzError::Storage(_) => 4200,
        }
    }
}

impl From<models::errors::ModelError> for AuthzError {
    fn from(e: models::errors::ModelError) -> Self { AuthzError::Storage(e.to_string()) }
}

/// Fails with `Forbidden` unless the context holds one of `allowed`.
pub fn ensure_role(ctx: &TenantContext, allowed: &[Role]) -> Result<(), AuthzError> {
    if ctx.has_role(allowed) {
        Ok(())
    } else {
        warn!(user_id = %ctx.user_id, organization_id = %ctx.organization_id, role = %ctx.role, "role_denied");
        Err(AuthzError::Forbidden(ctx.role))
    }
}

#[derive(Clone)]
pub struct TenantResolver {
    db: DatabaseConnection,
}

impl TenantResolver {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Resolve the organization and role the user acts under.
    ///
    /// The stored selection wins when it still names an active membership;
    /// otherwise a single active membership is used. Several memberships and
    /// no valid selection is an error rather than an arbitrary pick.
    #[instrument(skip(self))]
    pub async fn resolve(&self, user_id: Uuid) -> Result<TenantContext, AuthzError> {
        let user = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthzError::Storage(e.to_string()))?
            .ok_or(AuthzError::NoActiveOrganization)?;
        let active = membership::active_for_user(&self.db, user_id).await?;

        let chosen = match user.current_organization_id {
            Some(current) => active.iter().find(|m| m.organization_id == current),
            None => None,
        };
        let chosen = match (chosen, active.as_slice()) {
            (Some(m), _) => m,
            (None, []) => return Err(AuthzError::NoActiveOrganization),
            (None, [only]) => only,
            (None, _) => return Err(AuthzError::AmbiguousOrganization),
        };
        debug!(organization_id = %chosen.organization_id, role = %chosen.role, "tenant_resolved");
        Ok(TenantContext { user_id, organization_id: chosen.organization_id, role: chosen.role })
    }

    /// Resolve, then require one of `allowed`.
    pub async fn require_role(&self, user_id: Uuid, allowed: &[Role]) -> Result<TenantContext, AuthzError> {
        let ctx = self.resolve(user_id).await?;
        ensure_role(&ctx, allowed)?;
        Ok(ctx)
    }

    /// Persist an explicit current-organization choice.
    #[instrument(skip(self))]
    pub async fn select_organization(&self, user_id: Uuid, organization_id: Uuid) -> Result<TenantContext, AuthzError> {
        let m = membership::find(&self.db, organization_id, user_id)
            .await?
            .filter(|m| m.is_active)
            .ok_or(AuthzError::NotAMember)?;
        user::set_current_organization(&self.db, user_id, Some(organization_id)).await?;
        Ok(TenantContext { user_id, organization_id, role: m.role })
    }
}
