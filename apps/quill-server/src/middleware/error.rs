//! Error responses - short plain-text bodies with a matching status.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};
use std::fmt;

use quill_core::DomainError;

/// Application-level error type rendered as a plain-text response.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    InvalidCredentials,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    /// Carries the user-facing message; details are logged at conversion.
    Internal(&'static str),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => f.write_str(msg),
            AppError::InvalidCredentials => f.write_str("Invalid credentials"),
            AppError::Internal(msg) => f.write_str(msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }
}

impl AppError {
    /// Map a domain failure, using `failure` as the message for storage faults.
    pub fn from_domain(err: DomainError, failure: &'static str) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::Duplicate(_) => AppError::Conflict("Username is already taken".into()),
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::NotOwner { entity_type, .. } => AppError::Forbidden(format!(
                "You can only edit your own {}s.",
                entity_type.to_lowercase()
            )),
            err @ (DomainError::Storage(_) | DomainError::Session(_) | DomainError::Internal(_)) => {
                tracing::error!(error = %err, "{failure}");
                AppError::Internal(failure)
            }
        }
    }
}

/// Attach the user-facing failure message to a domain result.
pub trait OrRespond<T> {
    fn or_respond(self, failure: &'static str) -> AppResult<T>;
}

impl<T> OrRespond<T> for Result<T, DomainError> {
    fn or_respond(self, failure: &'static str) -> AppResult<T> {
        self.map_err(|e| AppError::from_domain(e, failure))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
