//! Error types for the API surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors a handler can return to the client
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Supabase error: {0}")]
    Database(String),
}

impl ApiError {
    /// Wrap a storage failure, surfacing the store's error text
    pub fn database(err: anyhow::Error) -> Self {
        ApiError::Database(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(ref msg) = self {
            tracing::error!("storage failure: {msg}");
        }

        let body = json!({
            "success": false,
            "error": self.to_string(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}
