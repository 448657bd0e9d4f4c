//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error body is `{"error": "<message>"}`; validation failures add a
//! `fields` object.

use axum::{
    Json,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ecommers_core::FieldErrors;
use ecommers_core::store::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::services::{AuthError, CheckoutError};

const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again.";
const INVALID_FORM: &str = "Invalid form data.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Login or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// A store read or write failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Cart session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

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
            Self::Auth(err) => err.is_server_error(),
            Self::Checkout(err) => matches!(err, CheckoutError::Store(_)),
            Self::Store(_) | Self::Session(_) => true,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredentials)
            | Self::Checkout(CheckoutError::NotLoggedIn)
            | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::Validation(_))
            | Self::Checkout(CheckoutError::EmptyCart)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(_) | Self::Checkout(_) | Self::Store(_) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    // Don't expose internal error details to clients
    fn message(&self) -> &str {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials. Please try again.",
            Self::Auth(AuthError::Validation(_)) => "Please correct the highlighted fields.",
            Self::Auth(AuthError::EmailTaken) => "This email is already registered.",
            Self::Checkout(CheckoutError::NotLoggedIn) => {
                "You must be logged in to place an order."
            }
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty.",
            Self::Checkout(CheckoutError::Store(_)) => "Failed to place order. Please try again.",
            Self::Auth(_) | Self::Store(_) | Self::Session(_) => GENERIC_FAILURE,
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg,
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
            Self::Auth(AuthError::Validation(fields)) => Some(fields),
            _ => None,
        };
        let body = ErrorBody {
            error: self.message(),
            fields,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected form body");
        Self::BadRequest(INVALID_FORM.to_owned())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
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
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a user action.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "abc")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
