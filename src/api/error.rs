//! API Error Taxonomy
//! Mission: Map every failure to a stable status code and reason string

use crate::auth::user_store::UserStoreError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Typed, terminal failures surfaced at the transport boundary.
///
/// `Unauthenticated` deliberately covers missing, garbled, expired, and
/// forged tokens as well as tokens for since-deleted users - callers must not
/// be able to tell those apart. `InvalidCredentials` is the login-time
/// equivalent, covering unknown user, wrong password, and disabled account.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    InvalidCredentials,
    InactiveAccount,
    InsufficientPrivilege,
    NotFound(String),
    Conflict(&'static str),
    Validation(String),
    Internal(anyhow::Error),
}

impl From<UserStoreError> for ApiError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateUsername => ApiError::Conflict("Username already registered"),
            UserStoreError::DuplicateEmail => ApiError::Conflict("Email already registered"),
            UserStoreError::NotFound => ApiError::NotFound("User not found".to_string()),
            UserStoreError::Database(e) => ApiError::Internal(e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let challenge = matches!(
            self,
            ApiError::Unauthenticated | ApiError::InvalidCredentials
        );

        let (status, message) = match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Incorrect username or password".to_string(),
            ),
            ApiError::InactiveAccount => (StatusCode::BAD_REQUEST, "Inactive user".to_string()),
            ApiError::InsufficientPrivilege => {
                (StatusCode::FORBIDDEN, "Not enough permissions".to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let mut response = (status, Json(json!({ "detail": message }))).into_response();
        if challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InactiveAccount.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientPrivilege.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("User not found".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("Username already registered")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unauthenticated_carries_challenge_header() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = ApiError::InsufficientPrivilege.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: ApiError = UserStoreError::DuplicateUsername.into();
        assert!(matches!(err, ApiError::Conflict(msg) if msg.contains("Username")));

        let err: ApiError = UserStoreError::DuplicateEmail.into();
        assert!(matches!(err, ApiError::Conflict(msg) if msg.contains("Email")));

        let err: ApiError = UserStoreError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
