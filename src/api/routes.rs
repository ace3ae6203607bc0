//! Router Assembly
//! Mission: Wire handlers, gates, and shared state into one axum app

use crate::auth::{
    api as auth_api, middleware::require_active_account, middleware::require_admin_account,
    IdentityResolver, JwtHandler, UserStore,
};
use crate::config::Config;
use crate::pokedex::{api as pokedex_api, PokedexStore};
use anyhow::Result;
use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub resolver: Arc<IdentityResolver>,
    pub pokedex: Arc<PokedexStore>,
}

impl AppState {
    /// Build stores and auth components from process configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let user_store = Arc::new(UserStore::new(&config.database_path)?);
        let jwt_handler = Arc::new(JwtHandler::new(
            config.secret_key.clone(),
            config.algorithm,
            config.access_token_expire_minutes,
        ));
        let resolver = Arc::new(IdentityResolver::new(
            jwt_handler.clone(),
            user_store.clone(),
        ));
        let pokedex = Arc::new(PokedexStore::new(&config.database_path)?);

        Ok(Self {
            user_store,
            jwt_handler,
            resolver,
            pokedex,
        })
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    // Authenticated tier: own profile
    let me_routes = Router::new()
        .route("/me", get(auth_api::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_active_account,
        ));

    let auth_routes = Router::new()
        .route("/login", post(auth_api::login))
        .route("/login/json", post(auth_api::login_json))
        .merge(me_routes);

    // Admin tier: the whole account-management surface
    let admin_routes = Router::new()
        .route(
            "/users",
            post(auth_api::create_user).get(auth_api::list_users),
        )
        .route(
            "/users/:id",
            get(auth_api::get_user)
                .put(auth_api::update_user)
                .delete(auth_api::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_account,
        ));

    // Public tier: catalog browsing
    let pokemon_routes = Router::new()
        .route("/", get(pokedex_api::list_pokemon))
        .route("/:name_or_id", get(pokedex_api::get_pokemon));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .nest("/pokemon", pokemon_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
