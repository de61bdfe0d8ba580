//! Structured API error responses.
//!
//! Every failure path returns a JSON payload; nothing is silently
//! swallowed. Validation problems map to 400, unknown ids to 404,
//! upstream AI failures to 500 with the vendor message carried
//! verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use uuid::Uuid;

use crate::store::StoreError;

/// API-level error, convertible straight into an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Task {0} not found")]
    TaskNotFound(Uuid),
    #[error("{0}")]
    Validation(String),
    #[error("API key is required")]
    MissingApiKey,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("{0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::TaskNotFound(id),
            StoreError::EmptyTitle => ApiError::Validation(err.to_string()),
            StoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::TaskNotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Task not found" }),
            ),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Validation failed", "error": msg }),
            ),
            ApiError::MissingApiKey => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "API key is required", "success": false }),
            ),
            ApiError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "Invalid API key",
                    "message": "Please check your generative-language API key",
                    "success": false
                }),
            ),
            ApiError::Upstream(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to generate AI response",
                    "message": msg,
                    "success": false
                }),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Something went wrong", "error": msg }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_api_errors() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApiError::from(StoreError::NotFound(id)),
            ApiError::TaskNotFound(got) if got == id
        ));
        assert!(matches!(
            ApiError::from(StoreError::EmptyTitle),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn not_found_renders_404() {
        let response = ApiError::TaskNotFound(Uuid::new_v4()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_key_renders_400() {
        let response = ApiError::MissingApiKey.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
