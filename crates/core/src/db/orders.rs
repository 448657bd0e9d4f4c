//! Placed orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use super::corrupt;
use crate::store::{OrderStore, StoreError};
use crate::{Email, Money, Order, OrderId, OrderLineItem, OrderStatus, UserId};

const ORDER_COLUMNS: &str = "id, user_id, customer_name, customer_email, shipping_address, items, total, status, order_date";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    customer_name: String,
    customer_email: String,
    shipping_address: String,
    items: Json<Vec<OrderLineItem>>,
    total: Decimal,
    status: String,
    order_date: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            customer_name: row.customer_name,
            customer_email: Email::parse(&row.customer_email).map_err(|e| corrupt("email", e))?,
            shipping_address: row.shipping_address,
            items: row.items.0,
            total: Money::new(row.total).map_err(|e| corrupt("total", e))?,
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("status", e))?,
            order_date: row.order_date,
        })
    }
}

/// Postgres [`OrderStore`].
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(order.id.as_str())
        .bind(order.user_id.as_str())
        .bind(&order.customer_name)
        .bind(order.customer_email.as_str())
        .bind(&order.shipping_address)
        .bind(Json(&order.items))
        .bind(order.total.amount())
        .bind(order.status.as_str())
        .bind(order.order_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY order_date DESC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn set_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("order {id}")));
        }
        Ok(())
    }
}
