//! Business logic behind the storefront routes.
//!
//! Services are generic over the storage traits in `ecommers_core::store`
//! so they run unchanged against Postgres or the in-memory stores.

pub mod auth;
pub mod checkout;

pub use auth::{AuthError, AuthService, SignedIn};
pub use checkout::{CheckoutError, CheckoutService, DEMO_SHIPPING_ADDRESS};
