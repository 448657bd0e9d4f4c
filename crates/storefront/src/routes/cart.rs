//! Cart route handlers.
//!
//! The cart is kept in the visitor's cart session; every mutating handler
//! loads it, applies one operation and saves it back.

use axum::{Json, extract::State};
use ecommers_core::store::ProductStore;
use ecommers_core::{Cart, CartItem, Money, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::AppForm;
use crate::middleware::{load_cart, save_cart};
use crate::state::AppState;

/// One cart line as returned to clients.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    pub price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id.clone(),
            name: item.product.name.clone(),
            image_url: item.product.image_url.clone(),
            price: item.product.price,
            quantity: item.quantity,
            line_total: item.line_total(),
        }
    }
}

/// Cart contents with derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub cart_total: Money,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            cart_total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub item_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Total quantity across all lines.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCount {
        item_count: cart.item_count(),
    }))
}

/// Add one unit of a product.
///
/// The product is loaded from the catalog so the cart holds current data.
/// Out-of-stock products are refused here; the cart itself does not check.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    AppForm(form): AppForm<AddToCartForm>,
) -> Result<Json<CartView>> {
    let product = state
        .products()
        .get(&ProductId::new(form.product_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_owned()))?;

    if !product.in_stock() {
        return Err(AppError::BadRequest(
            "This product is out of stock.".to_owned(),
        ));
    }

    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));

    let mut cart = load_cart(&session).await?;
    cart.add(product);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Set a line's quantity. Below 1 removes the line.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    AppForm(form): AppForm<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(&ProductId::new(form.product_id), form.quantity);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a line. Unknown products are ignored.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    AppForm(form): AppForm<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(&ProductId::new(form.product_id));
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}
