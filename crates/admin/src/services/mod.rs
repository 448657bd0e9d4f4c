//! Business logic behind the admin routes.
//!
//! Services are generic over the storage traits in `ecommers_core::store`.

pub mod catalog;
pub mod dashboard;
mod error;
pub mod orders;

pub use catalog::{CatalogService, ImageUpload, validate_product_input};
pub use dashboard::{DashboardStats, MonthlyRevenue, load_dashboard};
pub use error::AdminError;
pub use orders::OrderAdminService;

use ecommers_core::User;

/// The caller, if it is an administrator.
fn require_admin(caller: Option<&User>) -> Result<&User, AdminError> {
    caller
        .filter(|user| user.is_admin())
        .ok_or(AdminError::Unauthorized)
}
