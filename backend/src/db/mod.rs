//! Database connection and repositories

pub mod query;
pub mod recipes;
pub mod sqlite_helpers;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::db::query::DatabaseEntity;
use crate::db::sqlite_helpers::normalize_sqlite_url;

pub use recipes::{RecipeId, RecipeRecord, RecipeRow, SqliteRecipeRepository};

/// Default pool size when `DATABASE_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
        let url = normalize_sqlite_url(url);
        let options = SqliteConnectOptions::from_str(&url)
            .with_context(|| format!("Invalid SQLite URL '{}'", url))?
            .create_if_missing(true);
        Ok(options)
    }

    /// Create a new database connection pool. The parent directory of a file
    /// database is created when missing.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = Self::connect_options(url)?;
        if let Some(parent) = options.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database '{}'", url))?;

        Ok(Self { pool })
    }

    /// Connect, retrying every `retry_interval` up to `attempts` times.
    pub async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        retry_interval: Duration,
        attempts: u32,
    ) -> Result<Self> {
        let mut attempt = 1;
        loop {
            match Self::connect(url, max_connections).await {
                Ok(db) => return Ok(db),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        retry_in_secs = retry_interval.as_secs(),
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(retry_interval).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Private in-memory database. The pool holds a single connection that is
    /// never recycled, since every SQLite memory connection is its own database.
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(Self::connect_options("sqlite::memory:")?)
            .await
            .context("Failed to open in-memory database")?;

        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the recipe repository
    pub fn recipes(&self) -> SqliteRecipeRepository {
        SqliteRecipeRepository::new(self.pool.clone())
    }

    /// Create the tables this service needs if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        let sql = RecipeRow::create_table_sql();
        tracing::debug!(table = RecipeRow::TABLE_NAME, "Ensuring table exists");
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create table {}", RecipeRow::TABLE_NAME))?;
        Ok(())
    }

    /// `SELECT 1` round trip, used by the readiness check.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
