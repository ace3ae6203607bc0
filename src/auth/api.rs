//! Authentication & Admin API Endpoints
//! Mission: Provide login and user management endpoints

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::models::{
    valid_email, valid_username, CreateUserRequest, LoginRequest, Token, UpdateUserRequest, User,
    UserResponse, PASSWORD_MIN_LEN,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Form, Json,
};
use serde::Deserialize;
use tracing::{info, warn};

fn do_login(state: &AppState, username: &str, password: &str) -> Result<Token, ApiError> {
    // authenticate returns None uniformly for unknown user, wrong password,
    // and disabled account
    let user = state
        .user_store
        .authenticate(username, password)?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", username);
            ApiError::InvalidCredentials
        })?;

    let access_token = state.jwt_handler.issue(&user.username)?;

    info!("✅ Login successful: {}", user.username);
    Ok(Token::bearer(access_token))
}

/// Login with form credentials - POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> Result<Json<Token>, ApiError> {
    do_login(&state, &payload.username, &payload.password).map(Json)
}

/// Login with JSON credentials - POST /auth/login/json
pub async fn login_json(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Token>, ApiError> {
    do_login(&state, &payload.username, &payload.password).map(Json)
}

/// Get own profile - GET /auth/me
///
/// The gate has already resolved the live account into request extensions.
pub async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from_user(&user))
}

fn validate_new_user(payload: &CreateUserRequest) -> Result<(), ApiError> {
    if !valid_username(&payload.username) {
        return Err(ApiError::Validation(
            "Username must be 3-50 characters".to_string(),
        ));
    }
    if !valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if payload.password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_update(payload: &UpdateUserRequest) -> Result<(), ApiError> {
    if let Some(username) = &payload.username {
        if !valid_username(username) {
            return Err(ApiError::Validation(
                "Username must be 3-50 characters".to_string(),
            ));
        }
    }
    if let Some(email) = &payload.email {
        if !valid_email(email) {
            return Err(ApiError::Validation("Invalid email address".to_string()));
        }
    }
    if let Some(password) = &payload.password {
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(ApiError::Validation(format!(
                "Password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Create account - POST /admin/users (admin gate)
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_new_user(&payload)?;

    let user = state.user_store.create(
        &payload.username,
        &payload.email,
        &payload.password,
        payload.is_admin,
    )?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Number of records to skip
    pub skip: Option<i64>,
    /// Maximum number of records to return
    pub limit: Option<i64>,
}

/// List accounts - GET /admin/users (admin gate)
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(100).clamp(0, 1000);

    let users = state.user_store.list(skip, limit)?;
    let response = users.iter().map(UserResponse::from_user).collect();

    Ok(Json(response))
}

/// Get account by id - GET /admin/users/:id (admin gate)
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_store.get_by_id(user_id)?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// Update account (partial) - PUT /admin/users/:id (admin gate)
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_update(&payload)?;

    let user = state.user_store.update(user_id, &payload)?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// Delete account - DELETE /admin/users/:id (admin gate)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.user_store.delete(user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
