//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::corrupt;
use crate::store::{ProductStore, StoreError};
use crate::{Money, Product, ProductId, ProductPatch};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, category, image_url, image_hint, created_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    price: Decimal,
    stock: i64,
    category: String,
    image_url: String,
    image_hint: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Money::new(row.price).map_err(|e| corrupt("price", e))?,
            stock: u32::try_from(row.stock).map_err(|e| corrupt("stock", e))?,
            category: row.category,
            image_url: row.image_url,
            image_hint: row.image_hint,
            created_at: row.created_at,
        })
    }
}

/// Postgres [`ProductStore`]. Lists newest first.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.map(Product::try_from).transpose()
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(i64::from(product.stock))
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.image_hint.as_deref())
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: &ProductId, patch: &ProductPatch) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                category = COALESCE($6, category),
                image_url = COALESCE($7, image_url),
                image_hint = COALESCE($8, image_hint),
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price.map(Money::amount))
        .bind(patch.stock.map(i64::from))
        .bind(patch.category.as_deref())
        .bind(patch.image_url.as_deref())
        .bind(patch.image_hint.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
