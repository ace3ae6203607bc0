//! Credential Hashing
//! Mission: One-way salted password hashing, never store or compare plaintext

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password with bcrypt.
///
/// Each call salts independently, so two hashes of the same plaintext never
/// compare equal.
pub fn hash_password(plaintext: &str) -> Result<String> {
    hash(plaintext, DEFAULT_COST).context("Failed to hash password")
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// Returns false for a malformed hash rather than erroring, so callers get a
/// single boolean decision point.
pub fn verify_password(plaintext: &str, password_hash: &str) -> bool {
    verify(plaintext, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hashed = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hashed));
        assert!(!verify_password("hunter23", &hashed));
    }

    #[test]
    fn test_hashes_are_salted() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("same-password", &h1));
        assert!(verify_password("same-password", &h2));
    }

    #[test]
    fn test_mismatched_password_rejected() {
        let hashed = hash_password("pikachu").unwrap();
        assert!(!verify_password("raichu", &hashed));
        assert!(!verify_password("", &hashed));
    }

    #[test]
    fn test_malformed_hash_is_false_not_error() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }
}
