//! E-Commers V Core - Shared domain library.
//!
//! This crate provides the pieces shared by every E-Commers V component:
//! - `storefront` - Public shop: catalog, cart, checkout, login and registration
//! - `admin` - Back-office: product and order management
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The domain modules are pure: no I/O, no HTTP. Storage is reached only
//! through the traits in [`store`], so services can be exercised against the
//! in-memory stores (`testing` feature) and deployed against Postgres
//! (`postgres` feature).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, roles and statuses
//! - [`models`] - Product, order and user records
//! - [`cart`] - The per-visitor shopping cart
//! - [`session`] - Signed session tokens and the session cookie
//! - [`store`] - Storage and credential traits
//! - [`config`] - Environment helpers shared by the binaries
//! - [`validation`] - Field-level form errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod models;
pub mod session;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(feature = "postgres")]
pub mod db;

pub use cart::{Cart, CartItem};
pub use models::*;
pub use types::*;
pub use validation::FieldErrors;
