//! Identity Resolver
//! Mission: Turn a bearer token into a verified, live user record

use crate::api::error::ApiError;
use crate::auth::{jwt::JwtHandler, models::User, user_store::UserStore, user_store::UserStoreError};
use std::sync::Arc;

/// Resolves tokens to live accounts.
///
/// The account is reloaded from the directory on every call, never cached
/// from token claims, so privilege or active-status changes made after a
/// token was issued take effect on the next request.
pub struct IdentityResolver {
    jwt_handler: Arc<JwtHandler>,
    user_store: Arc<UserStore>,
}

impl IdentityResolver {
    pub fn new(jwt_handler: Arc<JwtHandler>, user_store: Arc<UserStore>) -> Self {
        Self {
            jwt_handler,
            user_store,
        }
    }

    /// Resolve a token to its live account.
    ///
    /// Fails `Unauthenticated` for a bad token, a missing subject, or a
    /// since-deleted user - deliberately the same error for all three, so a
    /// caller cannot distinguish "bad token" from "user later deleted".
    pub fn resolve(&self, token: &str) -> Result<User, ApiError> {
        let claims = self
            .jwt_handler
            .verify(token)
            .ok_or(ApiError::Unauthenticated)?;

        if claims.sub.is_empty() {
            return Err(ApiError::Unauthenticated);
        }

        match self.user_store.get_by_username(&claims.sub) {
            Ok(user) => Ok(user),
            Err(UserStoreError::NotFound) => Err(ApiError::Unauthenticated),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a token and additionally require the account to be active.
    ///
    /// Inactivity is a distinct error: revealing that the account exists is
    /// acceptable once the signature has already checked out.
    pub fn resolve_active(&self, token: &str) -> Result<User, ApiError> {
        let user = self.resolve(token)?;

        if !user.is_active {
            return Err(ApiError::InactiveAccount);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UpdateUserRequest;
    use jsonwebtoken::Algorithm;
    use tempfile::NamedTempFile;

    fn setup() -> (IdentityResolver, Arc<UserStore>, Arc<JwtHandler>, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = Arc::new(UserStore::new(temp_file.path().to_str().unwrap()).unwrap());
        let jwt = Arc::new(JwtHandler::new(
            "resolver-test-secret".to_string(),
            Algorithm::HS256,
            30,
        ));
        let resolver = IdentityResolver::new(jwt.clone(), store.clone());
        (resolver, store, jwt, temp_file)
    }

    #[test]
    fn test_resolve_live_account() {
        let (resolver, store, jwt, _temp) = setup();
        store
            .create("ash", "ash@pallet.town", "pikachu", false)
            .unwrap();

        let token = jwt.issue("ash").unwrap();
        let user = resolver.resolve(&token).unwrap();
        assert_eq!(user.username, "ash");
    }

    #[test]
    fn test_bad_token_and_deleted_user_look_identical() {
        let (resolver, store, jwt, _temp) = setup();
        let user = store
            .create("ash", "ash@pallet.town", "pikachu", false)
            .unwrap();
        let token = jwt.issue("ash").unwrap();

        // Garbled token
        let err = resolver.resolve("not.a.token").unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));

        // Valid signature but the subject has since been deleted
        store.delete(user.id).unwrap();
        let err = resolver.resolve(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn test_resolve_active_rejects_disabled_account() {
        let (resolver, store, jwt, _temp) = setup();
        let user = store
            .create("gary", "gary@pallet.town", "eevee", false)
            .unwrap();
        let token = jwt.issue("gary").unwrap();

        // Token was issued while active; disabling the account afterwards
        // must block it on the very next resolve_active.
        store
            .update(
                user.id,
                &UpdateUserRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(resolver.resolve(&token).is_ok());
        let err = resolver.resolve_active(&token).unwrap_err();
        assert!(matches!(err, ApiError::InactiveAccount));
    }

    #[test]
    fn test_resolve_sees_current_privileges() {
        let (resolver, store, jwt, _temp) = setup();
        let user = store
            .create("ash", "ash@pallet.town", "pikachu", false)
            .unwrap();
        let token = jwt.issue("ash").unwrap();

        assert!(!resolver.resolve(&token).unwrap().is_admin);

        store
            .update(
                user.id,
                &UpdateUserRequest {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        // Fresh load reflects the promotion without reissuing the token
        assert!(resolver.resolve(&token).unwrap().is_admin);
    }
}
