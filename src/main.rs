//! Pokedex API Server
//! Mission: Serve the Pokemon catalog and admin account management over REST

use anyhow::{Context, Result};
use dotenv::dotenv;
use pokedex_backend::{
    api::routes::{create_router, AppState},
    config::Config,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Token TTL: {}m, database: {}",
        config.access_token_expire_minutes, config.database_path
    );

    let state = AppState::new(&config).context("Failed to initialize application state")?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🚀 Pokedex API listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
