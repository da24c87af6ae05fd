//! Application state and HTTP router construction.
//!
//! Used by `main` and by the router tests to build the Axum app.

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::db::Database;
use crate::services::{RecipeMutationService, RecipeQueryService};
use crate::store::RecipeStore;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub queries: RecipeQueryService,
    pub mutations: RecipeMutationService,
}

impl AppState {
    /// Services backed by the SQLite repository of `db`.
    pub fn new(config: Arc<Config>, db: Database) -> Self {
        let store: Arc<dyn RecipeStore> = Arc::new(db.recipes());
        Self::with_store(config, db, store)
    }

    /// Services backed by an arbitrary store; `db` still answers readiness checks.
    pub fn with_store(config: Arc<Config>, db: Database, store: Arc<dyn RecipeStore>) -> Self {
        Self {
            config,
            db,
            queries: RecipeQueryService::new(store.clone()),
            mutations: RecipeMutationService::new(store),
        }
    }
}

/// Build the full Axum router: /api, health checks, and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .nest("/api", api::recipes::router())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
