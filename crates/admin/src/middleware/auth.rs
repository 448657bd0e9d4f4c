//! The admin gate.
//!
//! Admin trusts the session cookie the storefront issues. A request passes
//! only when that cookie verifies and carries the ADMIN role; anything else
//! is sent to the storefront login before a handler reads any data.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use ecommers_core::User;

use crate::error::set_sentry_user;
use crate::state::AppState;

/// Extractor that requires an administrator.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub User);

/// Rejection for anonymous visitors and non-admin users.
pub struct RedirectToLogin(String);

impl IntoResponse for RedirectToLogin {
    fn into_response(self) -> Response {
        Redirect::to(&self.0).into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = RedirectToLogin;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = parts.headers.get_all(header::COOKIE);
        let user = state
            .signer()
            .resolve_cookie_headers(cookies.iter().filter_map(|value| value.to_str().ok()));

        match user {
            Some(user) if user.is_admin() => {
                set_sentry_user(&user.id, Some(user.email.as_str()));
                Ok(Self(user))
            }
            Some(user) => {
                tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin refused");
                Err(RedirectToLogin(state.config().login_url()))
            }
            None => Err(RedirectToLogin(state.config().login_url())),
        }
    }
}
