//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management so every failure path maps to
//! exactly one entry of the response taxonomy: validation (400), conflict
//! (400), authentication (401), not-found (404), internal (500).
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers and
//! middleware can bubble errors with `?` and still produce the uniform
//! `{"success": false, "message": ...}` JSON body. Internal and database
//! failures are reported to the client as a generic string; the underlying
//! detail is only echoed (in an `error` field) when the process runs in
//! development mode.

use actix_web::{error::ResponseError, HttpResponse};
use lazy_static::lazy_static;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

lazy_static! {
    // Mirrors Config::from_env: anything other than APP_ENV=production
    // counts as development and may echo internal error detail.
    static ref EXPOSE_ERROR_DETAIL: bool =
        !matches!(std::env::var("APP_ENV").as_deref(), Ok("production"));
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input (HTTP 400).
    Validation(String),
    /// Missing, invalid, or expired credentials (HTTP 401).
    Unauthorized(String),
    /// Requested record absent, or owned by another user (HTTP 404).
    /// The two cases are deliberately indistinguishable.
    NotFound(String),
    /// Duplicate username or email at registration (HTTP 400).
    Conflict(String),
    /// Error originating from the database layer (HTTP 500).
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::Conflict(msg) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::Database(detail) | AppError::Internal(detail) => {
                log::error!("internal error: {}", detail);
                let mut body = json!({
                    "success": false,
                    "message": "Internal server error",
                });
                if *EXPOSE_ERROR_DETAIL {
                    body["error"] = json!(detail);
                }
                HttpResponse::InternalServerError().json(body)
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`; a unique-constraint violation that raced
/// past the registration duplicate probe maps to `Conflict`; everything else
/// becomes `Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Username or email already in use".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`,
/// distinguishing the three verification failure modes.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        use jsonwebtoken::errors::ErrorKind;
        let msg = match error.kind() {
            ErrorKind::ExpiredSignature => "Token expired",
            ErrorKind::InvalidSignature => "Invalid token signature",
            _ => "Malformed token",
        };
        AppError::Unauthorized(msg.into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::Validation("Title is required".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::Unauthorized("Token expired".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::NotFound("Todo not found".into());
        assert_eq!(error.error_response().status(), 404);

        // Registration conflicts are reported as 400, not 409.
        let error = AppError::Conflict("Email already in use".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::Database("connection reset".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::Internal("boom".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[test]
    fn test_token_error_mapping() {
        use jsonwebtoken::errors::{Error as JwtError, ErrorKind};

        let expired: AppError = JwtError::from(ErrorKind::ExpiredSignature).into();
        match expired {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected mapping: {:?}", other),
        }

        let bad_sig: AppError = JwtError::from(ErrorKind::InvalidSignature).into();
        match bad_sig {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Invalid token signature"),
            other => panic!("unexpected mapping: {:?}", other),
        }

        let garbage: AppError = JwtError::from(ErrorKind::InvalidToken).into();
        match garbage {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Malformed token"),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(error.error_response().status(), 404);
    }
}
