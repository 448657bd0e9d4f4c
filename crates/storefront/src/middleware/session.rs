//! Cart session configuration.
//!
//! The cart lives in an in-memory tower-sessions store keyed by its own
//! cookie. It never touches the database and disappears when the browser
//! session ends.

use ecommers_core::Cart;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

/// Cart session cookie name.
pub const CART_COOKIE_NAME: &str = "e-commers-v-cart";

/// Session key holding the serialized cart.
const CART_KEY: &str = "cart";

/// Create the cart session layer.
#[must_use]
pub fn create_cart_session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(CART_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Load the visitor's cart, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(CART_KEY).await?.unwrap_or_default())
}

/// Persist the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(CART_KEY, cart).await
}
