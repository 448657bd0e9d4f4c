//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error body is `{"error": "<message>"}`; validation failures add a
//! `fields` object.

use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ecommers_core::FieldErrors;
use ecommers_core::store::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::services::AdminError;

const SAVE_FAILURE: &str = "Failed to save changes. Please try again.";

/// Application-level error type for admin.
#[derive(Debug, Error)]
pub enum AppError {
    /// A catalog or order operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// A store read failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Admin(AdminError::Upload(_)) => true,
            Self::Admin(AdminError::Store(err)) | Self::Store(err) => {
                !matches!(err, StoreError::NotFound(_))
            }
            Self::Admin(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Admin(AdminError::Unauthorized) => StatusCode::FORBIDDEN,
            Self::Admin(AdminError::Validation(_) | AdminError::MissingFile)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Admin(AdminError::Store(StoreError::NotFound(_)))
            | Self::Store(StoreError::NotFound(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Admin(AdminError::Store(_) | AdminError::Upload(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    // Don't expose internal error details to clients
    fn message(&self) -> &str {
        match self {
            Self::Admin(AdminError::Unauthorized) => "Unauthorized",
            Self::Admin(AdminError::Validation(_)) => "Please correct the highlighted fields.",
            Self::Admin(AdminError::MissingFile) => "No file provided.",
            Self::Admin(AdminError::Upload(_)) => "Failed to upload image.",
            Self::Admin(AdminError::Store(StoreError::NotFound(_)))
            | Self::Store(StoreError::NotFound(_)) => "Not found.",
            Self::Admin(AdminError::Store(_)) | Self::Store(_) => SAVE_FAILURE,
            Self::NotFound(msg) | Self::BadRequest(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let fields = match &self {
            Self::Admin(AdminError::Validation(fields)) => Some(fields),
            _ => None,
        };
        let body = ErrorBody {
            error: self.message(),
            fields,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected JSON body");
        Self::BadRequest("Invalid request body.".to_owned())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected multipart body");
        Self::BadRequest("Expected a multipart upload.".to_owned())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in administrator.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
