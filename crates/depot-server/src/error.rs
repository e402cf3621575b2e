//! API error type
//!
//! Every error answers with `{"error": ["message", ...]}`. Storage failures
//! other than not-found are logged and reported without their details.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use depot_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::badge::BadgeError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// One message per rejected field (400)
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Invalid authentication token")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Badge(#[from] BadgeError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::Core(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Badge(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::Storage(e) if self.status() == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %e, "storage error");
                vec!["Storage error".to_string()]
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                vec!["Internal error".to_string()]
            }
            Self::Badge(e) => {
                tracing::warn!(error = %e, "badge unavailable");
                vec!["Cannot download badge".to_string()]
            }
            other => vec![other.to_string()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.messages(),
        };
        if status.is_client_error() {
            tracing::info!(status = status.as_u16(), error = ?body.error, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}
