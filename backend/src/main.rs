//! Recipe Backend - REST service for recipes with filtered search
//!
//! This is the main entry point. Recipes are served under /api/recipes.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_backend::config::Config;
use recipe_backend::db::Database;
use recipe_backend::{AppState, build_app};

const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(2);
const CONNECT_ATTEMPTS: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Recipe Backend");

    let config = Arc::new(Config::from_env()?);
    tracing::info!(database = %config.database_url, "Configuration loaded");

    let db = Database::connect_with_retry(
        &config.database_url,
        config.database_max_connections,
        CONNECT_RETRY_INTERVAL,
        CONNECT_ATTEMPTS,
    )
    .await?;
    db.ensure_schema().await?;
    tracing::info!("Database connected");

    let app = build_app(AppState::new(config.clone(), db));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
