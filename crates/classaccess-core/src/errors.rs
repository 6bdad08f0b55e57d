//! Application error type with HTTP response conversion.
//!
//! Every fallible handler and service returns `Result<T, AppError>`. Client
//! errors render their message as-is; server errors are logged with the full
//! error chain and, unless detail exposure is switched on, answered with a
//! generic message.

use std::sync::OnceLock;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const GENERIC_SERVER_ERROR: &str = "Error en el servidor";

static EXPOSE_INTERNAL_ERRORS: OnceLock<bool> = OnceLock::new();

/// Decides once per process whether 5xx responses carry the underlying error
/// text. Later calls are ignored.
pub fn set_expose_internal_errors(expose: bool) {
    let _ = EXPOSE_INTERNAL_ERRORS.set(expose);
}

fn expose_internal_errors() -> bool {
    EXPOSE_INTERNAL_ERRORS.get().copied().unwrap_or(false)
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub details: Vec<String>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            details: Vec::new(),
        }
    }

    fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, Error::msg(message.into()))
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::BAD_REQUEST, message)
    }

    /// 400 carrying one entry per failed rule.
    pub fn validation(details: Vec<String>) -> Self {
        Self {
            details,
            ..Self::with_message(StatusCode::BAD_REQUEST, "Error de validación")
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::CONFLICT, message)
    }

    /// The message a client would see for this error.
    pub fn public_message(&self) -> String {
        if self.status.is_server_error() && !expose_internal_errors() {
            GENERIC_SERVER_ERROR.to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Unhandled error");
        }

        let mut body = json!({
            "success": false,
            "message": self.public_message(),
        });
        if !self.details.is_empty() {
            body["errors"] = json!(self.details);
        }

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
