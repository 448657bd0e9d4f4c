//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product listing (home)
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart (session-backed)
//! GET  /cart                   - Cart lines and totals
//! GET  /cart/count             - Total quantity
//! POST /cart/add               - Add one unit (refuses out-of-stock)
//! POST /cart/update            - Set quantity (< 1 removes)
//! POST /cart/remove            - Remove line
//!
//! # Checkout
//! POST /checkout               - Place order from cart
//!
//! # Auth (rate limited)
//! POST /login                  - Login action
//! POST /register               - Register action
//! POST /logout                 - Logout action
//!
//! # Account (requires auth)
//! GET  /orders                 - Order history
//! GET  /profile                - Current identity
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route_layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/profile", get(account::profile))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::create_order))
        .merge(account_routes())
        .merge(auth_routes())
}
