//! API route definitions
//!
//! Recipe CRUD and search live under /api; health checks sit at the root.

pub mod error;
pub mod health;
pub mod recipes;

pub use error::{ApiError, ApiResult};
