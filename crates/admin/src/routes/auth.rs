//! Sign-out. Sign-in happens on the storefront.

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect},
};

use crate::error::clear_sentry_user;
use crate::state::AppState;

/// Clear the shared session cookie and return to the storefront login.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    clear_sentry_user();
    (
        [(SET_COOKIE, state.session_cookie().clear())],
        Redirect::to(&state.config().login_url()),
    )
}
