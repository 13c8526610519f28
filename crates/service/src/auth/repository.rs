use async_trait::async_trait;
use uuid::Uuid;

use models::Role;

use super::domain::{AuthUser, Credentials, RegisteredOwner};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user(&self, user_id: Uuid) -> Result<Option<AuthUser>, AuthError>;

    /// Create the user, their organization, the owner membership and the
    /// credentials as one unit; nothing is left behind on failure.
    async fn create_owner_account(
        &self,
        name: &str,
        login: &str,
        organization_name: &str,
        password_hash: String,
        password_algorithm: &str,
    ) -> Result<RegisteredOwner, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;

    async fn has_active_membership(&self, user_id: Uuid) -> Result<bool, AuthError>;
    /// Role of the user's membership in the organization, active or not.
    async fn membership_role(&self, organization_id: Uuid, user_id: Uuid) -> Result<Option<Role>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,           // key: login
        creds: Mutex<HashMap<Uuid, Credentials>>,          // key: user_id
        memberships: Mutex<HashMap<(Uuid, Uuid), (Role, bool)>>, // key: (organization_id, user_id) -> (role, active)
    }

    fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, AuthError> {
        m.lock().map_err(|_| AuthError::Repository("mock lock poisoned".into()))
    }

    impl MockAuthRepository {
        /// Flip every membership of the user to the given state.
        pub fn set_memberships_active(&self, user_id: Uuid, active: bool) -> Result<(), AuthError> {
            for ((_, uid), (_, flag)) in lock(&self.memberships)?.iter_mut() {
                if *uid == user_id {
                    *flag = active;
                }
            }
            Ok(())
        }

        pub fn add_membership(&self, organization_id: Uuid, user_id: Uuid, role: Role) -> Result<(), AuthError> {
            lock(&self.memberships)?.insert((organization_id, user_id), (role, true));
            Ok(())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_login(&self, login: &str) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users)?.get(login).cloned())
        }

        async fn find_user(&self, user_id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users)?.values().find(|u| u.id == user_id).cloned())
        }

        async fn create_owner_account(
            &self,
            name: &str,
            login: &str,
            _organization_name: &str,
            password_hash: String,
            password_algorithm: &str,
        ) -> Result<RegisteredOwner, AuthError> {
            let mut users = lock(&self.users)?;
            if users.contains_key(login) {
                return Err(AuthError::Conflict);
            }
            let organization_id = Uuid::new_v4();
            let user = AuthUser {
                id: Uuid::new_v4(),
                name: name.to_string(),
                login: login.to_string(),
                current_organization_id: Some(organization_id),
            };
            users.insert(login.to_string(), user.clone());
            lock(&self.memberships)?.insert((organization_id, user.id), (Role::Owner, true));
            lock(&self.creds)?.insert(
                user.id,
                Credentials { user_id: user.id, password_hash, password_algorithm: password_algorithm.to_string() },
            );
            Ok(RegisteredOwner { user, organization_id })
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            Ok(lock(&self.creds)?.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let c = Credentials { user_id, password_hash, password_algorithm };
            lock(&self.creds)?.insert(user_id, c.clone());
            Ok(c)
        }

        async fn has_active_membership(&self, user_id: Uuid) -> Result<bool, AuthError> {
            Ok(lock(&self.memberships)?.iter().any(|((_, uid), (_, active))| *uid == user_id && *active))
        }

        async fn membership_role(&self, organization_id: Uuid, user_id: Uuid) -> Result<Option<Role>, AuthError> {
            Ok(lock(&self.memberships)?.get(&(organization_id, user_id)).map(|(role, _)| *role))
        }
    }
}
