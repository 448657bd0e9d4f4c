//! Authentication route handlers.
//!
//! Login and registration are form posts. On success the session cookie is
//! set and the browser is sent on by role: administrators to the admin
//! dashboard, everyone else to the storefront home.

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::extract::{AppForm, CredentialsForm};
use crate::services::SignedIn;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Log in and set the session cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    CredentialsForm(form): CredentialsForm<LoginForm>,
) -> Result<Response> {
    let signed_in = state.auth().login(&form.email, &form.password).await?;
    Ok(signed_in_response(&state, &signed_in))
}

/// Create an account, then log it in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    AppForm(form): AppForm<RegisterForm>,
) -> Result<Response> {
    let signed_in = state
        .auth()
        .register(&form.name, &form.email, &form.password)
        .await?;
    Ok(signed_in_response(&state, &signed_in))
}

/// Clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    clear_sentry_user();
    (
        [(SET_COOKIE, state.session_cookie().clear())],
        Redirect::to("/login"),
    )
}

/// Where a freshly signed-in user is sent.
fn landing_url(state: &AppState, signed_in: &SignedIn) -> String {
    if signed_in.user.is_admin() {
        state.config().admin_dashboard_url()
    } else {
        "/".to_owned()
    }
}

fn signed_in_response(state: &AppState, signed_in: &SignedIn) -> Response {
    set_sentry_user(&signed_in.user.id, Some(signed_in.user.email.as_str()));
    let cookie = state.session_cookie().issue(&signed_in.token);
    (
        [(SET_COOKIE, cookie)],
        Redirect::to(&landing_url(state, signed_in)),
    )
        .into_response()
}
