//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ecommers_core::store::OrderStore;
use ecommers_core::{Order, OrderId, OrderStatus};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// All orders, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list().await?))
}

/// Order detail.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    state
        .orders()
        .get(&OrderId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found.".to_owned()))
}

/// Overwrite an order's status.
#[instrument(skip(state, admin))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    AppJson(update): AppJson<StatusUpdate>,
) -> Result<StatusCode> {
    state
        .order_admin()
        .update_order_status(Some(&admin), &OrderId::new(id), update.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
