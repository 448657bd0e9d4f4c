//! Order placement.

use chrono::Utc;
use ecommers_core::store::{OrderStore, StoreError};
use ecommers_core::{Cart, Order, OrderId, User};
use thiserror::Error;
use tracing::instrument;

/// Shipping address recorded on every order. Address capture is not part
/// of checkout.
pub const DEMO_SHIPPING_ADDRESS: &str = "123 Main St, Demo City";

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("no signed-in customer")]
    NotLoggedIn,

    #[error("cart is empty")]
    EmptyCart,

    #[error("failed to store order: {0}")]
    Store(#[from] StoreError),
}

/// Turns a cart into a placed order.
pub struct CheckoutService<'a, O> {
    orders: &'a O,
}

impl<'a, O: OrderStore> CheckoutService<'a, O> {
    #[must_use]
    pub const fn new(orders: &'a O) -> Self {
        Self { orders }
    }

    /// Place an order for the signed-in customer.
    ///
    /// The cart is only read. Callers clear it after this returns `Ok`, so
    /// a failed write leaves the cart intact for a retry.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotLoggedIn` without a customer,
    /// `CheckoutError::EmptyCart` for an empty cart, and
    /// `CheckoutError::Store` if the order cannot be written.
    #[instrument(skip_all, fields(user_id, item_count = cart.item_count()))]
    pub async fn create_order(
        &self,
        customer: Option<&User>,
        cart: &Cart,
    ) -> Result<OrderId, CheckoutError> {
        let customer = customer.ok_or(CheckoutError::NotLoggedIn)?;
        tracing::Span::current().record("user_id", tracing::field::display(&customer.id));

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = Order::from_cart(
            OrderId::generate(),
            customer,
            cart,
            DEMO_SHIPPING_ADDRESS,
            Utc::now(),
        );
        self.orders.insert(&order).await?;

        tracing::info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(order.id)
    }
}
