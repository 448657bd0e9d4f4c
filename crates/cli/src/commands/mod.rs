//! Command implementations.

pub mod migrate;
pub mod seed;

use ecommers_core::EmailError;
use ecommers_core::config::ConfigError;
use ecommers_core::store::{CredentialError, StoreError};

/// Errors from any `ecv-cli` command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}
