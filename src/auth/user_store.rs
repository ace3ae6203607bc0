//! User Storage
//! Mission: Store and manage user accounts with SQLite

use crate::auth::models::{UpdateUserRequest, User};
use crate::auth::password::{hash_password, verify_password};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::env;
use std::fmt;
use tracing::{info, warn};

/// Account directory errors surfaced to the API layer.
#[derive(Debug)]
pub enum UserStoreError {
    /// Username already taken by another account.
    DuplicateUsername,
    /// Email already taken by another account.
    DuplicateEmail,
    /// Referenced account does not exist.
    NotFound,
    /// Storage-level failure.
    Database(anyhow::Error),
}

impl fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStoreError::DuplicateUsername => write!(f, "Username already registered"),
            UserStoreError::DuplicateEmail => write!(f, "Email already registered"),
            UserStoreError::NotFound => write!(f, "User not found"),
            UserStoreError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for UserStoreError {}

impl From<anyhow::Error> for UserStoreError {
    fn from(err: anyhow::Error) -> Self {
        UserStoreError::Database(err)
    }
}

/// Map a late UNIQUE-constraint violation to the same conflict errors the
/// pre-checks produce. The unique indexes are the real uniqueness guarantor;
/// the pre-checks are a fast path for friendlier messages.
fn map_sqlite_err(err: rusqlite::Error) -> UserStoreError {
    if let rusqlite::Error::SqliteFailure(code, Some(msg)) = &err {
        if code.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("users.username") {
                return UserStoreError::DuplicateUsername;
            }
            if msg.contains("users.email") {
                return UserStoreError::DuplicateEmail;
            }
        }
    }
    UserStoreError::Database(err.into())
}

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.create_default_admin(&conn)?;

        Ok(())
    }

    /// Create default admin account for initial setup.
    ///
    /// There is no self-registration endpoint, so at least one admin must
    /// exist before anything else can be managed.
    fn create_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE is_admin = 1",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count == 0 {
            let password =
                env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
            let password_hash = hash_password(&password)?;
            let now = Utc::now().to_rfc3339();

            conn.execute(
                "INSERT INTO users (username, email, password_hash, is_active, is_admin, created_at, updated_at)
                 VALUES ('admin', 'admin@example.com', ?1, 1, 1, ?2, ?2)",
                params![password_hash, now],
            )
            .context("Failed to insert admin user")?;

            info!("🔐 Default admin account created (username: admin)");
            warn!("⚠️  CHANGE DEFAULT ADMIN PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            is_active: row.get::<_, i64>(4)? != 0,
            is_admin: row.get::<_, i64>(5)? != 0,
            created_at: parse_ts(row, 6)?,
            updated_at: parse_ts(row, 7)?,
        })
    }

    const USER_COLUMNS: &'static str =
        "id, username, email, password_hash, is_active, is_admin, created_at, updated_at";

    fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users WHERE username = ?1",
                Self::USER_COLUMNS
            ))
            .map_err(map_sqlite_err)?;

        match stmt.query_row(params![username], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(map_sqlite_err(e)),
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users WHERE email = ?1",
                Self::USER_COLUMNS
            ))
            .map_err(map_sqlite_err)?;

        match stmt.query_row(params![email], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(map_sqlite_err(e)),
        }
    }

    fn open(&self) -> Result<Connection, UserStoreError> {
        Connection::open(&self.db_path)
            .map_err(|e| UserStoreError::Database(anyhow::Error::from(e)))
    }

    /// Create a new account. Username uniqueness is checked before email so a
    /// request failing on both reports the username conflict.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, UserStoreError> {
        if self.find_by_username(username)?.is_some() {
            return Err(UserStoreError::DuplicateUsername);
        }
        if self.find_by_email(email)?.is_some() {
            return Err(UserStoreError::DuplicateEmail);
        }

        let password_hash =
            hash_password(password).map_err(UserStoreError::Database)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO users (username, email, password_hash, is_active, is_admin, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5, ?5)",
            params![username, email, password_hash, is_admin as i64, now],
        )
        .map_err(map_sqlite_err)?;

        let id = conn.last_insert_rowid();
        info!("✅ Created user: {} (admin: {})", username, is_admin);

        self.get_by_id(id)
    }

    /// Get user by id.
    pub fn get_by_id(&self, id: i64) -> Result<User, UserStoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users WHERE id = ?1",
                Self::USER_COLUMNS
            ))
            .map_err(map_sqlite_err)?;

        match stmt.query_row(params![id], Self::row_to_user) {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(UserStoreError::NotFound),
            Err(e) => Err(map_sqlite_err(e)),
        }
    }

    /// Get user by username.
    pub fn get_by_username(&self, username: &str) -> Result<User, UserStoreError> {
        self.find_by_username(username)?.ok_or(UserStoreError::NotFound)
    }

    /// List accounts in id order, sliced by `skip`/`limit`. An out-of-range
    /// `skip` yields an empty page, not an error.
    pub fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, UserStoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users ORDER BY id LIMIT ?1 OFFSET ?2",
                Self::USER_COLUMNS
            ))
            .map_err(map_sqlite_err)?;

        let users = stmt
            .query_map(params![limit, skip], Self::row_to_user)
            .map_err(map_sqlite_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqlite_err)?;

        Ok(users)
    }

    /// Partial update: only fields present in the request change. Privilege
    /// enforcement happens upstream - the store trusts its caller.
    pub fn update(&self, id: i64, update: &UpdateUserRequest) -> Result<User, UserStoreError> {
        let mut user = self.get_by_id(id)?;

        if let Some(username) = &update.username {
            if let Some(existing) = self.find_by_username(username)? {
                if existing.id != id {
                    return Err(UserStoreError::DuplicateUsername);
                }
            }
            user.username = username.clone();
        }

        if let Some(email) = &update.email {
            if let Some(existing) = self.find_by_email(email)? {
                if existing.id != id {
                    return Err(UserStoreError::DuplicateEmail);
                }
            }
            user.email = email.clone();
        }

        if let Some(password) = &update.password {
            user.password_hash =
                hash_password(password).map_err(UserStoreError::Database)?;
        }

        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }

        if let Some(is_admin) = update.is_admin {
            user.is_admin = is_admin;
        }

        let now = Utc::now().to_rfc3339();
        let conn = self.open()?;
        conn.execute(
            "UPDATE users
             SET username = ?1, email = ?2, password_hash = ?3, is_active = ?4, is_admin = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                user.username,
                user.email,
                user.password_hash,
                user.is_active as i64,
                user.is_admin as i64,
                now,
                id,
            ],
        )
        .map_err(map_sqlite_err)?;

        self.get_by_id(id)
    }

    /// Hard-delete an account. A second delete of the same id fails NotFound.
    pub fn delete(&self, id: i64) -> Result<(), UserStoreError> {
        let conn = self.open()?;
        let rows_affected = conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .map_err(map_sqlite_err)?;

        if rows_affected == 0 {
            return Err(UserStoreError::NotFound);
        }

        info!("🗑️  Deleted user: {}", id);
        Ok(())
    }

    /// Authenticate by username and password.
    ///
    /// Returns None uniformly for unknown username, wrong password, and
    /// inactive account - the login endpoint must not be able to tell these
    /// apart.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserStoreError> {
        let Some(user) = self.find_by_username(username)? else {
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash) {
            return Ok(None);
        }

        if !user.is_active {
            return Ok(None);
        }

        Ok(Some(user))
    }
}

fn parse_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
