//! Form extractors whose rejections render as JSON errors.
//!
//! axum's own `Form` rejection is a plain-text 422 naming the offending
//! field. These wrappers route it through [`AppError`] instead.

use axum::{
    extract::{FromRequest, rejection::FormRejection},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::services::AuthError;

/// `axum::Form` answering malformed bodies with a 400 `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);

/// `axum::Form` for login posts.
///
/// A malformed body gets the same response as a wrong password.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(CredentialsRejection))]
pub struct CredentialsForm<T>(pub T);

/// Rejection of a [`CredentialsForm`].
#[derive(Debug)]
pub struct CredentialsRejection;

impl From<FormRejection> for CredentialsRejection {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected login form");
        Self
    }
}

impl IntoResponse for CredentialsRejection {
    fn into_response(self) -> Response {
        AppError::Auth(AuthError::InvalidCredentials).into_response()
    }
}
