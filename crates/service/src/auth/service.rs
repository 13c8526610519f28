use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput, RegisteredOwner};
use super::errors::AuthError;
use super::password::{validate_password, HashParams, PasswordHasher, PASSWORD_ALGORITHM};
use super::repository::AuthRepository;
use super::token::TokenIssuer;
use crate::authz::{ensure_role, TenantContext, USER_ADMIN_ROLES};
use models::Role;

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub hash_params: HashParams,
}

impl AuthConfig {
    pub fn from_app(cfg: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            token_ttl: chrono::Duration::hours(cfg.token_ttl_hours),
            hash_params: HashParams::from(cfg),
        }
    }

    /// Cheap hashing and a fixed secret; for tests and examples.
    pub fn for_tests() -> Self {
        Self { jwt_secret: "test-secret".into(), token_ttl: chrono::Duration::hours(72), hash_params: HashParams::cheap() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            repo,
            hasher: PasswordHasher::new(cfg.hash_params)?,
            tokens: TokenIssuer::new(&cfg.jwt_secret, cfg.token_ttl),
        })
    }

    pub fn hasher(&self) -> &PasswordHasher { &self.hasher }

    /// Register a new owner: user, credentials, a fresh organization and an
    /// active owner membership on it.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::for_tests()).unwrap();
    /// let input = RegisterInput { name: "Ana".into(), login: "ana".into(), password: "Secret123".into() };
    /// let owner = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(owner.user.login, "ana");
    /// assert_eq!(owner.user.current_organization_id, Some(owner.organization_id));
    /// ```
    #[instrument(skip(self, input), fields(login = %input.login))]
    pub async fn register(&self, input: RegisterInput) -> Result<RegisteredOwner, AuthError> {
        models::user::validate_name(&input.name)?;
        models::user::validate_login(&input.login)?;
        validate_password(&input.password)?;
        let login = input.login.trim();

        if self.repo.find_user_by_login(login).await?.is_some() {
            debug!("login already registered");
            return Err(AuthError::Conflict);
        }

        let hash = self.hasher.hash(&input.password)?;
        let org_name = models::organization::store_name_for(&input.name);
        let owner = self.repo.create_owner_account(&input.name, login, &org_name, hash, PASSWORD_ALGORITHM).await?;
        info!(user_id = %owner.user.id, organization_id = %owner.organization_id, "user_registered");
        Ok(owner)
    }

    /// Authenticate and issue a session token.
    ///
    /// Unknown login, wrong password and a user without any active membership
    /// are indistinguishable to the caller.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::for_tests()).unwrap();
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { name: "N".into(), login: "n".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { login: "n".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(svc.verify_token(&session.token).unwrap(), session.user.id);
    /// ```
    #[instrument(skip(self, input), fields(login = %input.login))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let Some(user) = self.repo.find_user_by_login(input.login.trim()).await? else {
            self.hasher.verify_dummy(&input.password);
            warn!(reason = "unknown_login", "login_failed");
            return Err(AuthError::Unauthorized);
        };

        let Some(cred) = self.repo.get_credentials(user.id).await? else {
            self.hasher.verify_dummy(&input.password);
            warn!(user_id = %user.id, reason = "no_credentials", "login_failed");
            return Err(AuthError::Unauthorized);
        };

        if !self.hasher.verify(&input.password, &cred.password_hash)? {
            warn!(user_id = %user.id, reason = "bad_password", "login_failed");
            return Err(AuthError::Unauthorized);
        }

        if !self.repo.has_active_membership(user.id).await? {
            warn!(user_id = %user.id, reason = "no_active_membership", "login_failed");
            return Err(AuthError::Unauthorized);
        }

        let (token, expires_at) = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token, expires_at })
    }

    /// Replace another member's password. Owners and managers only; the
    /// target must belong to the actor's organization, and only an owner may
    /// reset an owner.
    #[instrument(skip(self, actor, new_password), fields(actor = %actor.user_id, organization_id = %actor.organization_id))]
    pub async fn reset_password(&self, actor: &TenantContext, target_user_id: Uuid, new_password: &str) -> Result<(), AuthError> {
        ensure_role(actor, USER_ADMIN_ROLES).map_err(|_| AuthError::Forbidden)?;
        validate_password(new_password)?;
        let target_role = self.repo.membership_role(actor.organization_id, target_user_id).await?.ok_or(AuthError::NotFound)?;
        if target_role == Role::Owner && actor.role != Role::Owner {
            warn!(target_user_id = %target_user_id, "owner_password_reset_denied");
            return Err(AuthError::Forbidden);
        }
        let hash = self.hasher.hash(new_password)?;
        self.repo.upsert_password(target_user_id, hash, PASSWORD_ALGORITHM.to_string()).await?;
        info!(target_user_id = %target_user_id, "password_reset");
        Ok(())
    }

    pub fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.tokens.verify(token)
    }

    pub async fn user(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user(user_id).await?.ok_or(AuthError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone(), AuthConfig::for_tests()).unwrap();
        (repo, svc)
    }

    fn register_input(login: &str) -> RegisterInput {
        RegisterInput { name: "Tester".into(), login: login.into(), password: "S3curePass!".into() }
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_short_passwords() {
        let (_, svc) = svc();
        svc.register(register_input("tester")).await.unwrap();
        assert!(matches!(svc.register(register_input("tester")).await, Err(AuthError::Conflict)));

        let short = RegisterInput { name: "A".into(), login: "a".into(), password: "short".into() };
        assert!(matches!(svc.register(short).await, Err(AuthError::Validation(_))));
        let blank = RegisterInput { name: " ".into(), login: "b".into(), password: "longenough".into() };
        assert!(matches!(svc.register(blank).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (repo, svc) = svc();
        let owner = svc.register(register_input("tester")).await.unwrap();

        let wrong_password = svc.login(LoginInput { login: "tester".into(), password: "wrong-pass".into() }).await.unwrap_err();
        let unknown_login = svc.login(LoginInput { login: "nobody".into(), password: "S3curePass!".into() }).await.unwrap_err();
        repo.set_memberships_active(owner.user.id, false).unwrap();
        let no_membership = svc.login(LoginInput { login: "tester".into(), password: "S3curePass!".into() }).await.unwrap_err();

        for err in [&wrong_password, &unknown_login, &no_membership] {
            assert!(matches!(err, AuthError::Unauthorized));
            assert_eq!(err.to_string(), "invalid credentials");
            assert_eq!(err.code(), 1004);
        }
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let (_, svc) = svc();
        let owner = svc.register(register_input("tester")).await.unwrap();
        let session = svc.login(LoginInput { login: "tester".into(), password: "S3curePass!".into() }).await.unwrap();
        assert_eq!(session.user.id, owner.user.id);
        assert_eq!(svc.verify_token(&session.token).unwrap(), owner.user.id);
        assert!(matches!(svc.verify_token("garbage"), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn reset_password_rules() {
        let (repo, svc) = svc();
        let owner = svc.register(register_input("owner")).await.unwrap();
        let staff = svc.register(register_input("staff")).await.unwrap();
        repo.add_membership(owner.organization_id, staff.user.id, Role::Cashier).unwrap();
        let outsider = svc.register(register_input("outsider")).await.unwrap();

        let owner_ctx = TenantContext { user_id: owner.user.id, organization_id: owner.organization_id, role: Role::Owner };
        let cashier_ctx = TenantContext { role: Role::Cashier, ..owner_ctx };

        assert!(matches!(svc.reset_password(&cashier_ctx, staff.user.id, "NewPass123").await, Err(AuthError::Forbidden)));
        assert!(matches!(svc.reset_password(&owner_ctx, outsider.user.id, "NewPass123").await, Err(AuthError::NotFound)));
        assert!(matches!(svc.reset_password(&owner_ctx, staff.user.id, "short").await, Err(AuthError::Validation(_))));

        svc.reset_password(&owner_ctx, staff.user.id, "NewPass123").await.unwrap();
        assert!(svc.login(LoginInput { login: "staff".into(), password: "NewPass123".into() }).await.is_ok());
        assert!(svc.login(LoginInput { login: "staff".into(), password: "S3curePass!".into() }).await.is_err());
    }

    #[tokio::test]
    async fn only_owners_reset_owner_passwords() {
        let (repo, svc) = svc();
        let owner = svc.register(register_input("owner")).await.unwrap();
        let manager = svc.register(register_input("manager")).await.unwrap();
        repo.add_membership(owner.organization_id, manager.user.id, Role::Manager).unwrap();

        let manager_ctx = TenantContext { user_id: manager.user.id, organization_id: owner.organization_id, role: Role::Manager };
        assert!(matches!(svc.reset_password(&manager_ctx, owner.user.id, "Takeover123").await, Err(AuthError::Forbidden)));
        assert!(svc.login(LoginInput { login: "owner".into(), password: "S3curePass!".into() }).await.is_ok());
        assert!(svc.login(LoginInput { login: "owner".into(), password: "Takeover123".into() }).await.is_err());

        // a manager still resets non-owner staff, and an owner resets a co-owner
        let cashier = svc.register(register_input("cashier")).await.unwrap();
        repo.add_membership(owner.organization_id, cashier.user.id, Role::Cashier).unwrap();
        svc.reset_password(&manager_ctx, cashier.user.id, "NewPass123").await.unwrap();

        let co_owner = svc.register(register_input("coowner")).await.unwrap();
        repo.add_membership(owner.organization_id, co_owner.user.id, Role::Owner).unwrap();
        let owner_ctx = TenantContext { user_id: owner.user.id, organization_id: owner.organization_id, role: Role::Owner };
        svc.reset_password(&owner_ctx, co_owner.user.id, "NewPass123").await.unwrap();
    }
}
