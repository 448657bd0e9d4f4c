//! Dashboard figures computed from the stores.

use chrono::{DateTime, Datelike, Utc};
use ecommers_core::store::{OrderStore, ProductStore, StoreError, UserStore};
use ecommers_core::{Money, Order, OrderStatus, Product};
use serde::Serialize;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    pub month: &'static str,
    pub total: Money,
}

/// Headline figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Sum of totals over orders that were not cancelled.
    pub total_revenue: Money,
    pub order_count: usize,
    pub customer_count: u64,
    /// Units in stock across the catalog.
    pub products_in_stock: u64,
    /// January through December of `year`, cancelled orders excluded.
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub year: i32,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(orders: &[Order], products: &[Product], customer_count: u64, year: i32) -> Self {
        let earning: Vec<&Order> = orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .collect();
        let total_revenue = earning.iter().map(|o| o.total).sum();

        let mut monthly = [Money::ZERO; 12];
        for order in earning.iter().filter(|o| o.order_date.year() == year) {
            let month = usize::try_from(order.order_date.month0()).ok();
            if let Some(slot) = month.and_then(|m| monthly.get_mut(m)) {
                *slot = *slot + order.total;
            }
        }

        Self {
            total_revenue,
            order_count: orders.len(),
            customer_count,
            products_in_stock: products.iter().map(|p| u64::from(p.stock)).sum(),
            monthly_revenue: MONTHS
                .into_iter()
                .zip(monthly)
                .map(|(month, total)| MonthlyRevenue { month, total })
                .collect(),
            year,
        }
    }
}

/// Read the stores and compute the dashboard for the year of `now`.
///
/// # Errors
///
/// Returns `StoreError` if any store read fails.
pub async fn load_dashboard<P, O, U>(
    products: &P,
    orders: &O,
    users: &U,
    now: DateTime<Utc>,
) -> Result<DashboardStats, StoreError>
where
    P: ProductStore,
    O: OrderStore,
    U: UserStore,
{
    let orders = orders.list().await?;
    let products = products.list().await?;
    let customers = users.count().await?;
    Ok(DashboardStats::compute(&orders, &products, customers, now.year()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use ecommers_core::store::memory::{MemoryOrderStore, MemoryProductStore, MemoryUserStore};
    use ecommers_core::{Cart, Email, OrderId, ProductId, ProductPatch, Role, User, UserId};

    use super::*;

    fn product(id: &str, dollars: u32, stock: u32) -> Product {
        Product::create(
            ProductId::new(id),
            ProductPatch {
                name: Some(id.to_owned()),
                price: Some(Money::from_dollars(dollars)),
                stock: Some(stock),
                ..ProductPatch::default()
            },
            Utc::now(),
        )
    }

    fn customer() -> User {
        User {
            id: UserId::new("u1"),
            name: "Ada".into(),
            email: Email::parse("ada@example.com").unwrap(),
            role: Role::User,
        }
    }

    fn order(id: &str, dollars: u32, date: DateTime<Utc>, status: OrderStatus) -> Order {
        let mut cart = Cart::new();
        cart.add(product("p", dollars, 1));
        let mut order = Order::from_cart(OrderId::new(id), &customer(), &cart, "addr", date);
        order.status = status;
        order
    }

    fn date(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_compute() {
        let orders = vec![
            order("a", 100, date(2025, 1), OrderStatus::Delivered),
            order("b", 50, date(2025, 1), OrderStatus::Pending),
            order("c", 70, date(2025, 3), OrderStatus::Cancelled),
            order("d", 30, date(2024, 12), OrderStatus::Shipped),
        ];
        let products = vec![product("x", 1, 4), product("y", 1, 0), product("z", 1, 6)];

        let stats = DashboardStats::compute(&orders, &products, 9, 2025);

        assert_eq!(stats.total_revenue, Money::from_dollars(180));
        assert_eq!(stats.order_count, 4);
        assert_eq!(stats.customer_count, 9);
        assert_eq!(stats.products_in_stock, 10);
        assert_eq!(stats.monthly_revenue.len(), 12);
        assert_eq!(
            stats.monthly_revenue.first().unwrap(),
            &MonthlyRevenue {
                month: "Jan",
                total: Money::from_dollars(150)
            }
        );
        assert_eq!(
            stats.monthly_revenue.get(2).unwrap().total,
            Money::ZERO,
            "cancelled orders earn nothing"
        );
        assert_eq!(stats.monthly_revenue.last().unwrap().total, Money::ZERO);
    }

    #[test]
    fn test_empty_store() {
        let stats = DashboardStats::compute(&[], &[], 0, 2025);
        assert_eq!(stats.total_revenue, Money::ZERO);
        assert!(stats.monthly_revenue.iter().all(|m| m.total == Money::ZERO));
    }

    #[tokio::test]
    async fn test_load_dashboard_reads_stores() {
        let products = MemoryProductStore::with_products(vec![product("x", 5, 3)]);
        let orders = MemoryOrderStore::new();
        orders
            .insert(&order("a", 20, date(2025, 6), OrderStatus::Pending))
            .await
            .unwrap();
        let users = MemoryUserStore::new();
        users.create(&customer()).await.unwrap();

        let stats = load_dashboard(&products, &orders, &users, date(2025, 7))
            .await
            .unwrap();

        assert_eq!(stats.order_count, 1);
        assert_eq!(stats.customer_count, 1);
        assert_eq!(stats.products_in_stock, 3);
        assert_eq!(stats.year, 2025);
        assert_eq!(
            stats.monthly_revenue.get(5).unwrap().total,
            Money::from_dollars(20)
        );
    }
}
