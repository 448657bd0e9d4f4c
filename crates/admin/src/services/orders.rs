//! Order administration.

use ecommers_core::store::OrderStore;
use ecommers_core::{OrderId, OrderStatus, User};
use tracing::instrument;

use super::{AdminError, require_admin};

/// Order status changes.
pub struct OrderAdminService<'a, O> {
    orders: &'a O,
}

impl<'a, O: OrderStore> OrderAdminService<'a, O> {
    #[must_use]
    pub const fn new(orders: &'a O) -> Self {
        Self { orders }
    }

    /// Overwrite an order's status.
    ///
    /// Any status may follow any other; there is no transition graph.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Unauthorized` for non-admin callers and
    /// `AdminError::Store` if the order is missing or the write fails.
    #[instrument(skip(self, caller))]
    pub async fn update_order_status(
        &self,
        caller: Option<&User>,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), AdminError> {
        let admin = require_admin(caller)?;
        self.orders.set_status(id, status).await?;
        tracing::info!(order_id = %id, %status, admin_id = %admin.id, "Order status updated");
        Ok(())
    }
}
