//! The shopping cart.
//!
//! A cart belongs to a single browsing session and is never persisted
//! before checkout. Line items keep a snapshot of the product they were
//! added from, in insertion order, with at most one line per product.

use serde::{Deserialize, Serialize};

use crate::{Money, Product, ProductId};

/// A product and how many units of it are in the cart.
///
/// `quantity` is always at least 1 for items held by a [`Cart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.price.times(self.quantity)
    }
}

/// Session-scoped cart state.
///
/// The cart does not look at stock. Callers that must not sell an
/// out-of-stock product check [`Product::in_stock`] before calling
/// [`Cart::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == product_id)
    }

    /// Add one unit of `product`, creating the line if needed.
    pub fn add(&mut self, product: Product) {
        match self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity below 1 removes the line. Unknown products are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| &item.product.id == product_id)
        {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Drop the line for `product_id`, if any.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|item| &item.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }
}
