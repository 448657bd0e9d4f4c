//! Dashboard route handlers.

use axum::{Json, extract::State, response::Redirect};
use chrono::Utc;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::{DashboardStats, load_dashboard};
use crate::state::AppState;

/// `/` sends administrators to the dashboard.
pub async fn index(RequireAdmin(_): RequireAdmin) -> Redirect {
    Redirect::to("/dashboard")
}

/// Revenue, order, customer and stock figures.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    let stats = load_dashboard(state.products(), state.orders(), state.users(), Utc::now()).await?;
    Ok(Json(stats))
}
