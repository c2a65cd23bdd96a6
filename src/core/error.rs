use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::{ApiResponse, FieldErrors};

#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0:?}")]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Single-field validation failure
    pub fn field(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![reason.into()]);
        AppError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(field_errors_from(&errors))
    }
}

/// Flatten validator output into the per-field error map
pub fn field_errors_from(errors: &validator::ValidationErrors) -> FieldErrors {
    let mut map = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        let reasons = map.entry(field.to_string()).or_default();
        for error in field_errors {
            let reason = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", error.code));
            reasons.push(reason);
        }
    }
    map
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

/// Map constraint violations onto client errors, everything else stays a database error
pub fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // unique_violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("email") {
                    return AppError::field("email", "A record with this email already exists.");
                }
            }
            return AppError::Conflict("A record with these values already exists.".to_string());
        }

        // foreign_key_violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("staff_id") {
                    return AppError::field("staff_id", "Staff member does not exist.");
                }
            }
            return AppError::BadRequest("Referenced record does not exist.".to_string());
        }

        // check_violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23514")) {
            return AppError::BadRequest("Record violates a database constraint.".to_string());
        }
    }

    AppError::Database(e)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error(Some("Database error occurred".to_string()), None),
                )
            }
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ApiResponse::<()>::error(Some(msg), None),
            ),
            AppError::Validation(field_errors) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::field_errors("Validation failed".to_string(), field_errors),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::error(Some(msg), None),
            ),
            AppError::Storage(ref msg) => {
                tracing::warn!("Storage error: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ApiResponse::<()>::error(Some("Failed to store uploaded file".to_string()), None),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error(Some("Internal server error".to_string()), None),
                )
            }
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::<()>::error(Some(msg), None),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ApiResponse::<()>::error(Some(msg), None),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ApiResponse::<()>::error(Some(msg), None),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::field("type", "blank"), StatusCode::BAD_REQUEST),
            (AppError::Storage("disk full".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_io_error_becomes_storage_error() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
