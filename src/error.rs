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

use crate::firestore::FirestoreError;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Store Errors**: Any FirestoreError from document store operations
/// - **Collision Errors**: Derived code already registered
/// - **Resource Errors**: Requested affiliate not found
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Document store operation failed.
    ///
    /// This wraps any FirestoreError using the `#[from]` attribute, which
    /// automatically implements `From<FirestoreError> for AppError`.
    #[error("Store error: {0}")]
    Store(#[from] FirestoreError),

    /// The derived promotional code is already registered.
    ///
    /// Returns HTTP 409 Conflict. Recoverable: the caller adjusts the
    /// name/description combination and resubmits.
    #[error("Code already registered")]
    CodeCollision,

    /// Requested affiliate does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Affiliate not found")]
    AffiliateNotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
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
/// # Status Code Mapping
///
/// - `CodeCollision` → 409 Conflict
/// - `AffiliateNotFound` → 404 Not Found
/// - `InvalidRequest` → 400 Bad Request
/// - `Store(PermissionDenied)` → 403 Forbidden
/// - `Store(_)` → 502 Bad Gateway
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::CodeCollision | AppError::Store(FirestoreError::AlreadyExists) => (
                StatusCode::CONFLICT,
                "code_collision",
                "This code already exists. Try another name and description combination."
                    .to_string(),
            ),
            AppError::AffiliateNotFound => (
                StatusCode::NOT_FOUND,
                "affiliate_not_found",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Store(FirestoreError::PermissionDenied(ref msg)) => {
                tracing::error!("store permission denied: {msg}");
                (
                    StatusCode::FORBIDDEN,
                    "permission_denied",
                    "The document store rejected the operation. Check the Firestore security rules."
                        .to_string(),
                )
            }
            AppError::Store(FirestoreError::Transport(ref err)) => {
                tracing::error!("store unreachable: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "store_unreachable",
                    "Could not reach the document store. Try again later.".to_string(),
                )
            }
            AppError::Store(FirestoreError::Api {
                status: store_status,
                ref message,
            }) => {
                tracing::error!("store error {store_status}: {message}");
                (StatusCode::BAD_GATEWAY, "store_error", message.clone())
            }
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
