//! Orders.
//!
//! An order is a self-contained snapshot: product name, image and unit
//! price are copied at placement so later catalog edits never rewrite
//! history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Cart, Email, Money, OrderId, OrderStatus, ProductId, User, UserId};

/// Product details copied into an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub image_url: String,
}

/// A single line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time of purchase.
    pub price: Money,
    pub product: ProductSnapshot,
}

impl OrderLineItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: Email,
    pub shipping_address: String,
    pub items: Vec<OrderLineItem>,
    pub total: Money,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
}

impl Order {
    /// Snapshot `cart` into a new `Pending` order for `customer`.
    #[must_use]
    pub fn from_cart(
        id: OrderId,
        customer: &User,
        cart: &Cart,
        shipping_address: impl Into<String>,
        order_date: DateTime<Utc>,
    ) -> Self {
        let items: Vec<OrderLineItem> = cart
            .items()
            .iter()
            .map(|line| OrderLineItem {
                product_id: line.product.id.clone(),
                quantity: line.quantity,
                price: line.product.price,
                product: ProductSnapshot {
                    name: line.product.name.clone(),
                    image_url: line.product.image_url.clone(),
                },
            })
            .collect();
        let total = items.iter().map(OrderLineItem::line_total).sum();

        Self {
            id,
            user_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            shipping_address: shipping_address.into(),
            items,
            total,
            status: OrderStatus::Pending,
            order_date,
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }
}
