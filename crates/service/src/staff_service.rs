//! Staff accounts inside an organization: listing, creation and membership edits.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use models::{membership, organization, user, user_credentials, Role};

use crate::{
    auth::password::{validate_password, PasswordHasher, PASSWORD_ALGORITHM},
    authz::{ensure_role, AuthzError, TenantContext, USER_ADMIN_ROLES},
    errors::ServiceError,
};

/// A member of the caller's organization as shown to administrators.
#[derive(Debug, Clone, Serialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
    pub login: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffMember {
    fn from_parts(m: membership::Model, u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            login: u.login,
            role: m.role,
            is_active: m.is_active,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStaffMember {
    pub name: String,
    pub login: String,
    pub password: String,
    pub role: Role,
}

/// Partial membership update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMember {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// The calling user with the organization and role they currently act under.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub login: String,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub role: Role,
}

/// Only owners hand out or touch owner memberships.
fn guard_owner_role(ctx: &TenantContext, involves_owner: bool) -> Result<(), AuthzError> {
    if involves_owner && ctx.role != Role::Owner {
        return Err(AuthzError::Forbidden(ctx.role));
    }
    Ok(())
}

#[derive(Clone)]
pub struct StaffService {
    db: DatabaseConnection,
    hasher: PasswordHasher,
}

impl StaffService {
    pub fn new(db: DatabaseConnection, hasher: PasswordHasher) -> Self { Self { db, hasher } }

    pub async fn me(&self, ctx: &TenantContext) -> Result<Profile, ServiceError> {
        let u = user::Entity::find_by_id(ctx.user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))?;
        let org = organization::Entity::find_by_id(ctx.organization_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("organization"))?;
        Ok(Profile {
            id: u.id,
            name: u.name,
            login: u.login,
            organization_id: org.id,
            organization_name: org.name,
            role: ctx.role,
        })
    }

    /// Members of the caller's organization, ordered by name.
    pub async fn list_users(&self, ctx: &TenantContext) -> Result<Vec<StaffMember>, ServiceError> {
        ensure_role(ctx, USER_ADMIN_ROLES)?;
        let rows = membership::Entity::find()
            .filter(membership::Column::OrganizationId.eq(ctx.organization_id))
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?;
        let mut members: Vec<StaffMember> = rows
            .into_iter()
            .filter_map(|(m, u)| u.map(|u| StaffMember::from_parts(m, u)))
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.login.cmp(&b.login)));
        Ok(members)
    }

    /// New user, credentials and membership in the caller's organization,
    /// written in one storage transaction.
    #[instrument(skip(self, ctx, input), fields(organization_id = %ctx.organization_id, login = %input.login, role = %input.role))]
    pub async fn create_user(&self, ctx: &TenantContext, input: NewStaffMember) -> Result<StaffMember, ServiceError> {
        ensure_role(ctx, USER_ADMIN_ROLES)?;
        guard_owner_role(ctx, input.role == Role::Owner)?;
        user::validate_name(&input.name)?;
        user::validate_login(&input.login)?;
        validate_password(&input.password)?;
        if user::find_by_login(&self.db, &input.login).await?.is_some() {
            return Err(ServiceError::Conflict("login already taken".into()));
        }
        let hash = self.hasher.hash(&input.password)?;

        let txn = self.db.begin().await?;
        let created = async {
            let u = user::create(&txn, &input.name, &input.login, Some(ctx.organization_id)).await?;
            user_credentials::upsert_password(&txn, u.id, hash, PASSWORD_ALGORITHM).await?;
            let m = membership::create(&txn, ctx.organization_id, u.id, input.role).await?;
            Ok::<_, ServiceError>(StaffMember::from_parts(m, u))
        }
        .await;
        match created {
            Ok(member) => {
                txn.commit().await?;
                info!(user_id = %member.id, "staff_created");
                Ok(member)
            }
            Err(e) => {
                if let Err(rb) = txn.rollback().await {
                    error!(error = %rb, "rollback failed");
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self, ctx, changes), fields(organization_id = %ctx.organization_id))]
    pub async fn update_member(&self, ctx: &TenantContext, user_id: Uuid, changes: UpdateMember) -> Result<StaffMember, ServiceError> {
        ensure_role(ctx, USER_ADMIN_ROLES)?;
        let current = membership::find(&self.db, ctx.organization_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))?;
        guard_owner_role(ctx, current.role == Role::Owner || changes.role == Some(Role::Owner))?;

        let mut am: membership::ActiveModel = current.into();
        if let Some(role) = changes.role {
            am.role = Set(role);
        }
        if let Some(active) = changes.is_active {
            am.is_active = Set(active);
        }
        am.updated_at = Set(Utc::now().into());
        let m = am.update(&self.db).await?;
        let u = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))?;
        info!(%user_id, role = %m.role, is_active = m.is_active, "membership_updated");
        Ok(StaffMember::from_parts(m, u))
    }
}
