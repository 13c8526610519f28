use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait};
use tracing::warn;
use uuid::Uuid;

use models::{membership, organization, user, user_credentials, Role};

use crate::auth::domain::{AuthUser, Credentials, RegisteredOwner};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

#[derive(Clone)]
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_auth_user(u: user::Model) -> AuthUser {
    AuthUser { id: u.id, name: u.name, login: u.login, current_organization_id: u.current_organization_id }
}

fn to_credentials(c: user_credentials::Model) -> Credentials {
    Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }
}

fn repo_err(e: sea_orm::DbErr) -> AuthError { AuthError::Repository(e.to_string()) }

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(user::find_by_login(&self.db, login).await?.map(to_auth_user))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(user_id).one(&self.db).await.map_err(repo_err)?;
        Ok(res.map(to_auth_user))
    }

    async fn create_owner_account(
        &self,
        name: &str,
        login: &str,
        organization_name: &str,
        password_hash: String,
        password_algorithm: &str,
    ) -> Result<RegisteredOwner, AuthError> {
        let txn = self.db.begin().await.map_err(repo_err)?;
        let created = async {
            let org = organization::create(&txn, organization_name).await?;
            let u = user::create(&txn, name, login, Some(org.id)).await?;
            membership::create(&txn, org.id, u.id, Role::Owner).await?;
            user_credentials::upsert_password(&txn, u.id, password_hash, password_algorithm).await?;
            Ok::<_, AuthError>(RegisteredOwner { user: to_auth_user(u), organization_id: org.id })
        }
        .await;
        match created {
            Ok(owner) => {
                txn.commit().await.map_err(repo_err)?;
                Ok(owner)
            }
            Err(e) => {
                if let Err(rb) = txn.rollback().await {
                    warn!(error = %rb, "rollback after failed registration");
                }
                Err(e)
            }
        }
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        Ok(user_credentials::find_for_user(&self.db, user_id).await?.map(to_credentials))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm).await?;
        Ok(to_credentials(c))
    }

    async fn has_active_membership(&self, user_id: Uuid) -> Result<bool, AuthError> {
        let count = membership::Entity::find()
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(count > 0)
    }

    async fn membership_role(&self, organization_id: Uuid, user_id: Uuid) -> Result<Option<Role>, AuthError> {
        Ok(membership::find(&self.db, organization_id, user_id).await?.map(|m| m.role))
    }
}
