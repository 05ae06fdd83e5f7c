//! Domain error types for Testdeck.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Upload request carried no file part
    #[error("No file uploaded")]
    NoFileUploaded,

    /// Uploaded file is not declared as XML
    #[error("Invalid file type")]
    InvalidFileType,

    /// Uploaded buffer is not well-formed XML
    #[error("Invalid XML")]
    InvalidXml,

    /// Well-formed XML whose root does not match the expected schema
    #[error("Invalid XML format")]
    InvalidFormat,

    /// Branch compared against itself
    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    /// Uniqueness violated on a registration-style path
    #[error("{0}")]
    Conflict(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found (or not visible to the caller's organization)
    #[error("{0}")]
    NotFound(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::NoFileUploaded => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "NO_FILE_UPLOADED",
                self.to_string(),
            ),
            AppError::InvalidFileType => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_FILE_TYPE",
                self.to_string(),
            ),
            AppError::InvalidXml => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_XML",
                self.to_string(),
            ),
            AppError::InvalidFormat => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_FORMAT",
                self.to_string(),
            ),
            AppError::InvalidComparison(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_COMPARISON",
                self.to_string(),
            ),
            AppError::Conflict(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "CONFLICT",
                self.to_string(),
            ),
            AppError::InvalidInput(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                self.to_string(),
            ),
            AppError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            AppError::Unauthorized(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
            ),
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching the OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid UUID: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_client_input_errors_map_to_400() {
        for err in [
            AppError::NoFileUploaded,
            AppError::InvalidFileType,
            AppError::InvalidXml,
            AppError::InvalidFormat,
            AppError::InvalidComparison("cannot compare a branch to itself".to_string()),
            AppError::Conflict("Organization".to_string()),
        ] {
            assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_not_found_and_database_statuses() {
        assert_eq!(
            AppError::NotFound("Branch".to_string())
                .error_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database("boom".to_string())
                .error_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Unauthorized("missing session".to_string())
                .error_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
