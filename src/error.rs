//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Server Errors**: database failures, an unreadable entropy source,
///   or an exhausted key allocation budget
/// - **Caller Errors**: invalid pagination bounds
/// - **Access Errors**: missing session or an ability that denies the action
/// - **Negative Results**: no usable auth key for the presented value
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The operating system's secure random source could not be read.
    ///
    /// Key generation never falls back to a weaker source.
    #[error("Secure random source unavailable")]
    EntropySourceUnavailable,

    /// Every freshly generated key collided with an existing one.
    #[error("Could not allocate a unique auth key after {attempts} attempts")]
    KeyAllocationExhausted { attempts: usize },

    /// Requested page or page size is out of bounds.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid pagination")]
    InvalidPagination(String),

    /// No usable auth key matches.
    ///
    /// Revoked and nonexistent keys produce this same variant so callers
    /// cannot tell them apart. Returns HTTP 404 Not Found.
    #[error("Auth key not found")]
    AuthKeyNotFound,

    /// Request carries no valid session.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller's ability does not permit the action.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Action not permitted")]
    Forbidden,
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Server-side failures hide their details from the client; they are
/// logged instead.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidPagination(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_pagination", msg.clone())
            }
            AppError::AuthKeyNotFound => {
                (StatusCode::NOT_FOUND, "auth_key_not_found", self.to_string())
            }
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database operation failed");
                internal_error()
            }
            AppError::EntropySourceUnavailable => {
                tracing::error!("secure random source unavailable");
                internal_error()
            }
            AppError::KeyAllocationExhausted { attempts } => {
                tracing::error!(attempts, "auth key allocation exhausted");
                internal_error()
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An internal error occurred".to_string(),
    )
}
