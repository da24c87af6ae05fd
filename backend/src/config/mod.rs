//! Application configuration management

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::db::DEFAULT_MAX_CONNECTIONS;
use crate::pagination::DEFAULT_PAGE_SIZE;

/// Upper bound applied to a requested page size unless `MAX_PAGE_SIZE` says otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite URL or bare path. DATABASE_PATH wins over DATABASE_URL.
    pub database_url: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// Page size used when a search omits `size`
    pub default_page_size: u32,

    /// Largest page size a search may request
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite:./data/recipes.db".to_string(),
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_PATH")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            database_url,
            database_max_connections: parse_var(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            default_page_size: parse_var(&lookup, "DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_var(&lookup, "MAX_PAGE_SIZE", defaults.max_page_size)?,
        };

        anyhow::ensure!(
            config.database_max_connections > 0,
            "DATABASE_MAX_CONNECTIONS must be at least 1"
        );
        anyhow::ensure!(config.default_page_size > 0, "DEFAULT_PAGE_SIZE must be at least 1");
        anyhow::ensure!(
            config.max_page_size >= config.default_page_size,
            "MAX_PAGE_SIZE ({}) must not be below DEFAULT_PAGE_SIZE ({})",
            config.max_page_size,
            config.default_page_size
        );

        Ok(config)
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
