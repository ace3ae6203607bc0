//! Process Configuration
//! Mission: Load all runtime settings once at startup, hold them immutable

use jsonwebtoken::Algorithm;
use std::env;
use tracing::warn;

/// Immutable process-wide configuration, read from the environment once.
///
/// Rotating `secret_key` invalidates every outstanding token; there is no
/// multi-key grace period.
#[derive(Debug, Clone)]
pub struct Config {
    /// JWT signing secret shared by issue and verify.
    pub secret_key: String,
    /// Signing algorithm (HS256 unless overridden).
    pub algorithm: Algorithm,
    /// Access token time-to-live in minutes.
    pub access_token_expire_minutes: i64,
    /// Path to the sqlite database file.
    pub database_path: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

const DEFAULT_SECRET: &str = "your-secret-key-change-this-in-production";

impl Config {
    /// Build configuration from environment variables with development defaults.
    pub fn from_env() -> Self {
        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
        if secret_key == DEFAULT_SECRET {
            warn!("⚠️  Using default SECRET_KEY - set SECRET_KEY in production!");
        }

        let algorithm = env::var("JWT_ALGORITHM")
            .ok()
            .and_then(|v| v.parse::<Algorithm>().ok())
            .unwrap_or(Algorithm::HS256);

        let access_token_expire_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(30);

        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "db.sqlite3".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        Self {
            secret_key,
            algorithm,
            access_token_expire_minutes,
            database_path,
            bind_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // from_env falls back to development defaults when vars are unset
        let config = Config::from_env();
        assert_eq!(config.algorithm, Algorithm::HS256);
        assert!(config.access_token_expire_minutes > 0);
        assert!(!config.secret_key.is_empty());
    }
}
