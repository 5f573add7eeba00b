//! Unified error handling.
//!
//! Domain-specific error enums feed a single `AppError` used for control
//! flow throughout the application. `AppError` implements actix's
//! `ResponseError`, so handlers return `Result<HttpResponse, AppError>`
//! and the HTTP mapping lives in one place. Authentication failures keep
//! their internal kind for logging but all render as the same generic
//! 401 body, so clients cannot probe which stage rejected them.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use sqlx::error::DatabaseError as SqlxDatabaseError;
use std::error::Error as StdError;
use std::fmt;

/// Input validation failures.
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication failures.
///
/// The variants are deliberately fine-grained so logs can tell a tampered
/// token from an expired one, or a revoked refresh token from an unknown
/// one. None of this granularity is ever echoed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    CredentialMismatch,
    TokenMalformed,
    TokenExpired,
    TokenSignatureInvalid,
    TokenWrongIssuer,
    RefreshTokenNotFound,
    RefreshTokenExpired,
    RefreshTokenRevoked,
    MissingBearerHeader,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::CredentialMismatch => write!(f, "incorrect email or password"),
            AuthError::TokenMalformed => write!(f, "access token could not be parsed"),
            AuthError::TokenExpired => write!(f, "access token has expired"),
            AuthError::TokenSignatureInvalid => write!(f, "access token signature is invalid"),
            AuthError::TokenWrongIssuer => write!(f, "access token was issued by another party"),
            AuthError::RefreshTokenNotFound => write!(f, "refresh token is not known"),
            AuthError::RefreshTokenExpired => write!(f, "refresh token has expired"),
            AuthError::RefreshTokenRevoked => write!(f, "refresh token has been revoked"),
            AuthError::MissingBearerHeader => {
                write!(f, "missing or malformed bearer credential")
            }
        }
    }
}

impl StdError for AuthError {}

/// Storage failures.
#[derive(Debug)]
pub enum DatabaseError {
    UniqueViolation(String),
    NotFound(String),
    Unavailable(String),
    Unexpected(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueViolation(msg) => write!(f, "duplicate entry: {}", msg),
            DatabaseError::NotFound(msg) => write!(f, "{}", msg),
            DatabaseError::Unavailable(msg) => write!(f, "database unavailable: {}", msg),
            DatabaseError::Unexpected(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Central error type that all application errors map to.
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Database(DatabaseError),
    /// The caller is authenticated but does not own the resource.
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Forbidden(msg) => write!(f, "{}", msg),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                AppError::Database(DatabaseError::NotFound("record not found".to_string()))
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Database(DatabaseError::UniqueViolation(db.message().to_string()))
            }
            sqlx::Error::PoolTimedOut => AppError::Database(DatabaseError::Unavailable(
                "connection pool timed out".to_string(),
            )),
            sqlx::Error::Io(e) => AppError::Database(DatabaseError::Unavailable(e.to_string())),
            other => AppError::Database(DatabaseError::Unexpected(other.to_string())),
        }
    }
}

/// JSON body rendered for every error response.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl AppError {
    /// Log the error with its internal kind. Client-facing bodies stay
    /// generic; this is where the detail goes instead.
    fn log(&self) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "validation failed");
            }
            AppError::Auth(e) => {
                tracing::warn!(kind = ?e, error = %e, "authentication failed");
            }
            AppError::Forbidden(msg) => {
                tracing::warn!(error = %msg, "ownership check failed");
            }
            AppError::Database(DatabaseError::NotFound(msg)) => {
                tracing::warn!(error = %msg, "resource not found");
            }
            AppError::Database(DatabaseError::UniqueViolation(msg)) => {
                tracing::warn!(error = %msg, "unique constraint violation");
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
            }
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, code) = match self {
            AppError::Validation(e) => (e.to_string(), "VALIDATION_ERROR"),
            // One opaque message for every auth-kind failure.
            AppError::Auth(_) => ("Unauthorized".to_string(), "UNAUTHORIZED"),
            AppError::Forbidden(msg) => (msg.clone(), "FORBIDDEN"),
            AppError::Database(DatabaseError::NotFound(msg)) => (msg.clone(), "NOT_FOUND"),
            AppError::Database(DatabaseError::UniqueViolation(_)) => {
                ("email is already registered".to_string(), "DUPLICATE_ENTRY")
            }
            AppError::Database(_) => ("database error occurred".to_string(), "STORAGE_ERROR"),
            AppError::Internal(_) => ("internal server error".to_string(), "INTERNAL_ERROR"),
        };
        ErrorBody {
            error,
            code: code.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
