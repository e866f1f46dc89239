//! # Centralized Error Handling
//!
//! Every handler returns [`AppResult`]. Failures are classified once, here,
//! and mapped to an HTTP status with a `{ "message": ... }` body:
//!
//! | Class | Status |
//! |---|---|
//! | Not found | 404 |
//! | Validation | 400 |
//! | Transient (store/mail timeout, lost connection) | 503 / 502 |
//! | Anything else | 500 |
//!
//! Transient failures are never retried inside a handler; the caller decides.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::email::EmailError;
use crate::store::StoreError;

/// Sent as `Retry-After` on transient failures
const RETRY_AFTER_SECS: &str = "5";

/// Central application error type.
///
/// Store and mail errors are logged when converted into a response; other
/// variants should be logged where they are created if needed.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("email error: {0}")]
    Email(#[from] EmailError),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::Timeout) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(StoreError::Db(e)) => match e {
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Email(EmailError::SendFailed(_)) => StatusCode::BAD_GATEWAY,
            AppError::Email(EmailError::Timeout) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// True for failures a caller may reasonably retry later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.status_code(),
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let transient = self.is_transient();

        match &self {
            AppError::Store(e) => error!(error = %e, %status, "Data store failure"),
            AppError::Email(e) => warn!(error = %e, %status, "Email delivery failure"),
            _ => {}
        }

        let message = match self {
            AppError::Store(_) if status == StatusCode::SERVICE_UNAVAILABLE => {
                "Database temporarily unavailable".to_string()
            }
            AppError::Store(_) if status == StatusCode::NOT_FOUND => "Not found".to_string(),
            AppError::Store(_) => "Database error".to_string(),
            AppError::Email(EmailError::Timeout) => "Email service timed out".to_string(),
            AppError::Email(_) => "Failed to send email".to_string(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.to_string(),
            AppError::Validation(msg) => msg,
        };

        let mut response = (status, Json(ErrorBody { message })).into_response();
        if transient {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "Rejected request body");
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection, "Rejected path parameter");
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection, "Rejected query string");
        AppError::Validation(rejection.body_text())
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
