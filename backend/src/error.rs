//! Error types shared by the store and the recipe services.
//!
//! Store failures are carried unchanged inside [`RecipeError::Store`]; the
//! services only add the domain-level [`RecipeError::NotFound`].

use thiserror::Error;

use crate::db::RecipeId;

/// Failures surfaced by a [`RecipeStore`](crate::store::RecipeStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Any error reported by sqlx (connection, constraint, I/O, ...)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The ingredients column did not hold a JSON string array.
    #[error("corrupt ingredient list for recipe {id}: {source}")]
    CorruptIngredients {
        id: RecipeId,
        #[source]
        source: serde_json::Error,
    },

    /// An overwrite targeted a row that no longer exists.
    #[error("recipe {0} is not persisted")]
    NotPersisted(RecipeId),
}

/// Errors returned by the query and mutation services.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The identifier did not resolve in the store.
    #[error("Recipe not found with id: {0}")]
    NotFound(RecipeId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type RecipeResult<T> = Result<T, RecipeError>;
