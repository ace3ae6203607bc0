//! Access Control Gate
//! Mission: Protect endpoints with tiered token checks

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::models::User;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Pull the bearer token out of the Authorization header.
fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Authenticated tier: a valid, unexpired token for an active account.
///
/// The resolved account is stashed in request extensions for handlers.
pub async fn require_active_account(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or(ApiError::Unauthenticated)?;
    let user = state.resolver.resolve_active(&token)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Admin tier: the authenticated check plus the admin flag.
///
/// Strictly additive - a non-admin with a perfectly valid token gets 403,
/// never 401.
pub async fn require_admin_account(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or(ApiError::Unauthenticated)?;
    let user = state.resolver.resolve_active(&token)?;

    if !user.is_admin {
        return Err(ApiError::InsufficientPrivilege);
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Extract the resolved account from a request (use after the gate).
pub fn extract_account(req: &Request) -> Option<&User> {
    req.extensions().get::<User>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[test]
    fn test_bearer_token_extraction() {
        let req = HttpRequest::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));

        // Wrong scheme or no header yields nothing
        let req = HttpRequest::builder()
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert!(bearer_token(&req).is_none());

        let req = HttpRequest::new(Body::empty());
        assert!(bearer_token(&req).is_none());
    }

    #[test]
    fn test_extract_account_from_extensions() {
        use chrono::Utc;

        let mut req = HttpRequest::new(Body::empty());
        assert!(extract_account(&req).is_none());

        let user = User {
            id: 1,
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        req.extensions_mut().insert(user);

        let extracted = extract_account(&req).unwrap();
        assert_eq!(extracted.username, "testuser");
    }
}
