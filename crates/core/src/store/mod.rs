//! Storage seams.
//!
//! Services are generic over these traits. The binaries plug in the
//! Postgres implementations from [`crate::db`]; tests use the in-memory
//! ones from [`memory`].

use std::future::Future;

use crate::{Email, Order, OrderId, OrderStatus, Product, ProductId, ProductPatch, User, UserId};

#[cfg(any(test, feature = "testing"))]
pub mod memory;

/// Errors from the document stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The record to update does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored record could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Errors from the credential-verification capability.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("credentials rejected")]
    Rejected,

    #[error("an identity with this email already exists")]
    AlreadyExists,

    #[error("credential service unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the binary object store.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("object store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// User profiles (`users`) and the admin role marker (`roles_admin`).
pub trait UserStore: Send + Sync {
    fn get(&self, id: &UserId) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn find_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Create a profile. ADMIN profiles get their role marker in the same
    /// atomic write.
    fn create(&self, user: &User) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Create or merge a profile, keeping the role marker in step.
    fn upsert(&self, user: &User) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Catalog products.
pub trait ProductStore: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

    fn get(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<Product>, StoreError>> + Send;

    fn insert(&self, product: &Product) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Apply a partial update.
    ///
    /// Returns [`StoreError::NotFound`] when no product has `id`.
    fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a product. Returns whether it existed.
    fn delete(&self, id: &ProductId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete every product. Returns how many were removed.
    fn delete_all(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Placed orders.
pub trait OrderStore: Send + Sync {
    fn insert(&self, order: &Order) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get(&self, id: &OrderId) -> impl Future<Output = Result<Option<Order>, StoreError>> + Send;

    /// All orders, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Orders placed by `user_id`, newest first.
    fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Overwrite the status of an order.
    ///
    /// Returns [`StoreError::NotFound`] when no order has `id`.
    fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// The credential-verification capability.
///
/// This is the only component that sees passwords.
pub trait CredentialVerifier: Send + Sync {
    /// Check a password and return the identity it belongs to.
    fn verify(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<UserId, CredentialError>> + Send;

    /// Create an identity. Fails with [`CredentialError::AlreadyExists`]
    /// when the email is taken.
    fn create_identity(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> impl Future<Output = Result<UserId, CredentialError>> + Send;

    fn delete_identity(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<(), CredentialError>> + Send;

    fn find_identity(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<UserId>, CredentialError>> + Send;
}

/// Binary object storage for product images.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<String, ObjectStoreError>> + Send;
}
