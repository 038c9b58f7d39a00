//! Error types for Clipnest
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//!
//! One deliberate status mapping is applied everywhere:
//! 400 invalid input, 401 missing/invalid credential, 403 forbidden,
//! 404 missing entity, 409 uniqueness conflict, 502 media-host failure,
//! 500 store/internal.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced entity absent (404)
    #[error("Resource not found")]
    NotFound,

    /// Missing/invalid/expired credential (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Valid credential, forbidden action (403)
    #[error("Access denied")]
    Forbidden,

    /// Missing or blank required input (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate unique field (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Media host upload/delete failure (502)
    #[error("Media host error: {0}")]
    MediaHost(String),

    /// HTTP client error talking to the media host (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::MediaHost(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to the uniform error envelope `{statusCode, message}`
    fn into_response(self) -> Response {
        use axum::Json;

        let status = self.status_code();
        let (message, error_type) = match &self {
            AppError::NotFound => (self.to_string(), "not_found"),
            AppError::Unauthorized => (self.to_string(), "unauthorized"),
            AppError::Forbidden => (self.to_string(), "forbidden"),
            AppError::Validation(msg) => (msg.clone(), "validation"),
            AppError::Conflict(msg) => (msg.clone(), "conflict"),
            AppError::MediaHost(msg) => (msg.clone(), "media_host"),
            AppError::HttpClient(_) => (self.to_string(), "http_client"),
            // Internal detail stays out of the response body
            AppError::Database(_) => ("Database error".to_string(), "database"),
            AppError::Config(msg) => (msg.clone(), "config"),
            AppError::Internal(_) => ("Internal server error".to_string(), "internal"),
        };

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "statusCode": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
