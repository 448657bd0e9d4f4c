//! Persistent records.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderLineItem, ProductSnapshot};
pub use product::{Product, ProductInput, ProductPatch};
pub use user::User;
