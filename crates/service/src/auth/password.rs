//! Argon2id password hashing with configurable cost.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use super::errors::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const PASSWORD_ALGORITHM: &str = "argon2id";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashParams {
    /// Lowest legal cost; only for tests and benchmarks.
    pub const fn cheap() -> Self {
        Self { memory_kib: 8, iterations: 1, parallelism: 1 }
    }
}

impl From<&configs::AuthConfig> for HashParams {
    fn from(cfg: &configs::AuthConfig) -> Self {
        Self { memory_kib: cfg.argon2_memory_kib, iterations: cfg.argon2_iterations, parallelism: cfg.argon2_parallelism }
    }
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PasswordHasher {
    argon: Argon2<'static>,
    /// Verified against when the login is unknown so timing matches a real check.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(params: HashParams) -> Result<Self, AuthError> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon
            .hash_password(salt.as_str().as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        Ok(Self { argon, dummy_hash })
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string())
    }

    /// Parameters embedded in the stored hash win over the configured ones,
    /// so hashes made under an older cost still verify.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(self.argon.verify_password(password.as_bytes(), &parsed).is_ok())
    }

    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new(HashParams::cheap()).unwrap();
        let hash = hasher.hash("Secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Secret123", &hash).unwrap());
        assert!(!hasher.verify("secret123", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = PasswordHasher::new(HashParams::cheap()).unwrap();
        assert_ne!(hasher.hash("Secret123").unwrap(), hasher.hash("Secret123").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = PasswordHasher::new(HashParams::cheap()).unwrap();
        assert!(hasher.verify("whatever", "admin123").is_err());
    }

    #[test]
    fn length_rule() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
    }
}
