//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Money, ProductId};

/// Image used when a product is created without one.
pub const DEFAULT_IMAGE_URL: &str = "https://picsum.photos/seed/default/600/800";

/// A catalog product.
///
/// Stock is informational: adding to the cart and placing an order never
/// reserve or decrement it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: u32,
    pub category: String,
    pub image_url: String,
    /// Short keyword description of the image, used as alt text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hint: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Build a new product from the supplied fields, defaulting the rest.
    #[must_use]
    pub fn create(id: ProductId, fields: ProductPatch, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            price: fields.price.unwrap_or(Money::ZERO),
            stock: fields.stock.unwrap_or(0),
            category: fields.category.unwrap_or_default(),
            image_url: fields
                .image_url
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_owned()),
            image_hint: fields.image_hint,
            created_at,
        }
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if patch.image_hint.is_some() {
            self.image_hint = patch.image_hint;
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A partial set of product fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_hint: Option<String>,
}

impl ProductPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.image_hint.is_none()
    }
}

/// Payload of a product upsert: updates `id` when present, creates otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(flatten)]
    pub fields: ProductPatch,
}
