//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use ecommers_core::store::ProductStore;
use ecommers_core::{Product, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product listing, newest first. Also served at `/`.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().list().await?))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    state
        .products()
        .get(&ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found.".to_owned()))
}
