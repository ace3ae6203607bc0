//! Authentication Module
//! Mission: Credential hashing, JWT tokens, and tiered access control

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod resolver;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::{require_active_account, require_admin_account};
pub use resolver::IdentityResolver;
pub use user_store::UserStore;
