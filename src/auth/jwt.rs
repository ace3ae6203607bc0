//! JWT Token Handler
//! Mission: Issue and verify signed, time-limited bearer tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    algorithm: Algorithm,
    expire_minutes: i64,
}

impl JwtHandler {
    pub fn new(secret: String, algorithm: Algorithm, expire_minutes: i64) -> Self {
        Self {
            secret,
            algorithm,
            expire_minutes,
        }
    }

    /// Issue a token for a subject, expiring `expire_minutes` from now.
    pub fn issue(&self, subject: &str) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::minutes(self.expire_minutes))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expiration,
        };

        debug!(
            "Issuing JWT for {}, expires in {}m",
            subject, self.expire_minutes
        );

        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign JWT")
    }

    /// Verify signature and expiry in one pass.
    ///
    /// Returns None for every failure cause (malformed, forged, expired) so
    /// callers cannot tell why a token was rejected.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(self.algorithm);
        // No leeway: a token is invalid the instant its exp passes.
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handler(secret: &str) -> JwtHandler {
        JwtHandler::new(secret.to_string(), Algorithm::HS256, 30)
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let handler = test_handler("test-secret-key-12345");

        let token = handler.issue("testuser").unwrap();
        assert!(!token.is_empty());

        let claims = handler.verify(&token).unwrap();
        assert_eq!(claims.sub, "testuser");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let handler = test_handler("test-secret-key-12345");
        assert!(handler.verify("invalid.token.here").is_none());
        assert!(handler.verify("").is_none());
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = test_handler("secret1");
        let handler2 = test_handler("secret2");

        let token = handler1.issue("testuser").unwrap();
        assert!(handler2.verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let handler = test_handler("test-secret-key-12345");

        // Encode claims with the same secret but an exp in the past
        let claims = Claims {
            sub: "testuser".to_string(),
            exp: (Utc::now().timestamp() - 1) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        // With zero leeway the expired token must fail
        assert!(handler.verify(&token).is_none());
    }

    #[test]
    fn test_token_verifies_just_before_expiry() {
        let claims = Claims {
            sub: "testuser".to_string(),
            exp: (Utc::now().timestamp() + 2) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        let handler = test_handler("test-secret-key-12345");
        assert!(handler.verify(&token).is_some());
    }
}
