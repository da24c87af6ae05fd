//! HTTP error mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::error::RecipeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// Request payload or query failed validation; one message per violation.
    #[error("{}", .0.join("; "))]
    InvalidInput(Vec<String>),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(vec![message.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Recipe(RecipeError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Recipe(RecipeError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Store details stay in the log.
            Self::Recipe(RecipeError::Store(e)) => {
                tracing::error!(error = %e, "Recipe store failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
