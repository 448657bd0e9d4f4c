//! Admin service errors.

use ecommers_core::FieldErrors;
use ecommers_core::store::{ObjectStoreError, StoreError};
use thiserror::Error;

/// Errors from catalog and order administration.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The caller is not an administrator. Nothing was written.
    #[error("Unauthorized")]
    Unauthorized,

    /// Product input failed validation.
    #[error("invalid product: {0}")]
    Validation(FieldErrors),

    /// The upload carried no file.
    #[error("no file provided")]
    MissingFile,

    /// A store read or write failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The image could not be stored.
    #[error("image upload failed: {0}")]
    Upload(#[from] ObjectStoreError),
}
