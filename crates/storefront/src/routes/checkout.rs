//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use ecommers_core::OrderId;
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{OptionalAuth, load_cart, save_cart};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
}

/// Place an order from the cart.
///
/// The cart is cleared only once the order is stored.
#[instrument(skip_all)]
pub async fn create_order(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<(StatusCode, Json<OrderPlaced>)> {
    let mut cart = load_cart(&session).await?;
    let order_id = state.checkout().create_order(user.as_ref(), &cart).await?;

    cart.clear();
    if let Err(e) = save_cart(&session, &cart).await {
        // The order exists; report success and leave the stale cart.
        tracing::warn!(error = %e, order_id = %order_id, "Failed to clear cart after checkout");
    }

    Ok((StatusCode::CREATED, Json(OrderPlaced { order_id })))
}
