//! Account route handlers (require a signed-in user).

use axum::{Json, extract::State};
use ecommers_core::store::OrderStore;
use ecommers_core::{Order, User};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order history for the signed-in user, newest first.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_for_user(&user.id).await?))
}

/// The identity carried by the session.
pub async fn profile(RequireAuth(user): RequireAuth) -> Json<User> {
    Json(user)
}
