use crate::services::CatalogError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

const GENERIC_SERVER_ERROR: &str = "Internal server error";

/// A lightweight wrapper for general errors that keeps the message local.
///
/// Every failure leaves the API in the same envelope:
/// `{"error": {"status": false, "code": <http status>, "msg": "..."}}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    /// Shortcut for 422 Unprocessable Entity
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), msg = %self.message, "request failed");
        } else {
            tracing::warn!(status = self.status.as_u16(), msg = %self.message, "request rejected");
        }

        let body = Json(json!({
            "error": {
                "status": false,
                "code": self.status.as_u16(),
                "msg": self.message,
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::ItemNotFound
            | CatalogError::OptionNotFound
            | CatalogError::ImageNotFound
            | CatalogError::UserNotFound => StatusCode::NOT_FOUND,
            CatalogError::WrongCredentials => StatusCode::BAD_REQUEST,
            CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
            CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CatalogError::Sqlx(_) | CatalogError::Io(_) | CatalogError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            // keep driver details in the log, not in the response
            tracing::error!(error = %err, "unhandled service error");
            return AppError::internal(GENERIC_SERVER_ERROR);
        }

        AppError::new(status, err.to_string())
    }
}
