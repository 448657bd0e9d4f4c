//! Authentication extractors.
//!
//! The signed session cookie is the only source of identity. Any token that
//! is missing, tampered with, signed with another key, or expired resolves
//! to an anonymous visitor.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use ecommers_core::User;

use crate::state::AppState;

fn session_user(state: &AppState, parts: &Parts) -> Option<User> {
    let cookies = parts.headers.get_all(header::COOKIE);
    state
        .signer()
        .resolve_cookie_headers(cookies.iter().filter_map(|value| value.to_str().ok()))
}

/// Extractor that requires a signed-in user.
///
/// Browsers are sent to the login page; other clients get a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when authentication is required but the user is not logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "You must be logged in." })),
            )
                .into_response(),
        }
    }
}

fn wants_html(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_user(state, parts).map(Self).ok_or_else(|| {
            if wants_html(parts) {
                AuthRejection::RedirectToLogin
            } else {
                AuthRejection::Unauthorized
            }
        })
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject anonymous visitors.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(state, parts)))
    }
}
