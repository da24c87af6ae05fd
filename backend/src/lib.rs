//! Recipe backend: recipe storage with filtered, paginated search.
//!
//! Searches are built from optional criteria by [`filters::RecipePredicate`]
//! and executed against a [`store::RecipeStore`], either SQLite
//! ([`db::SqliteRecipeRepository`]) or memory ([`store::InMemoryRecipeStore`]).

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod pagination;
pub mod services;
pub mod store;

pub use app::{AppState, build_app};
