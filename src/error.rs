use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures a handler can produce, mapped to HTTP statuses in
/// `IntoResponse`. Store and other unexpected errors collapse into a
/// generic 500 so internals never leak to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingField(&'static str),
    #[error("Validation failed: Full name must contain only alphabetic characters.")]
    InvalidName,
    #[error("Validation failed: Invalid email format.")]
    InvalidEmail,
    #[error("Validation failed: Password must be at least 8 characters long with one uppercase, one lowercase, one digit, and one special character.")]
    WeakPassword,
    #[error("Validation failed: Email already exists.")]
    DuplicateEmail,
    #[error("User not found.")]
    NotFound,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("No file uploaded.")]
    MissingFile,
    #[error("Server error.")]
    Store(#[source] sqlx::Error),
    #[error("Server error.")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        // The users.email unique constraint is the authority on
        // duplicates; the handler-level existence check is advisory.
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                return ApiError::DuplicateEmail;
            }
        }
        ApiError::Store(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::InvalidName
            | ApiError::InvalidEmail
            | ApiError::WeakPassword
            | ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Store(e) => error!(error = %e, "store error"),
                ApiError::Internal(e) => error!(error = %e, "internal error"),
                _ => {}
            }
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
