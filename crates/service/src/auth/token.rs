//! HS256 session tokens carrying only the user id.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>), AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>), AuthError> {
        let expires_at = now + self.ttl;
        let claims = Claims { sub: user_id.to_string(), iat: now.timestamp(), exp: expires_at.timestamp() };
        let token = encode(&JwtHeader::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok((token, expires_at))
    }

    /// Check signature and expiry, returning the user id.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|_| AuthError::InvalidToken)?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify() {
        let issuer = TokenIssuer::new("secret", Duration::hours(72));
        let uid = Uuid::new_v4();
        let (token, exp) = issuer.issue(uid).unwrap();
        assert!(exp > Utc::now() + Duration::hours(71));
        assert_eq!(issuer.verify(&token).unwrap(), uid);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("secret", Duration::hours(1));
        let (token, _) = issuer.issue_at(Uuid::new_v4(), Utc::now() - Duration::hours(2)).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = TokenIssuer::new("secret", Duration::hours(1));
        let theirs = TokenIssuer::new("other-secret", Duration::hours(1));
        let (token, _) = theirs.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(ours.verify(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(ours.verify("not-a-jwt"), Err(AuthError::InvalidToken)));
    }
}
