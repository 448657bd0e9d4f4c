//! Postgres-backed stores.
//!
//! # Tables
//!
//! - `users` - User profiles
//! - `roles_admin` - Admin role markers
//! - `credentials` - Argon2 password hashes, owned by [`PgCredentialStore`]
//! - `products` - Catalog
//! - `orders` - Placed orders, line items as JSONB
//!
//! # Migrations
//!
//! Migrations are stored in `crates/core/migrations/` and run via:
//! ```bash
//! cargo run -p ecommers-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::store::StoreError;

pub mod credentials;
pub mod orders;
pub mod products;
pub mod users;

pub use credentials::PgCredentialStore;
pub use orders::PgOrderStore;
pub use products::PgProductStore;
pub use users::PgUserStore;

/// Embedded migrations for the whole schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_owned())
            }
            sqlx::Error::RowNotFound => Self::NotFound("row not found".to_owned()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::DataCorruption(e.to_string())
            }
            other => Self::Unavailable(other.to_string()),
        }
    }
}

pub(crate) fn corrupt(what: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::DataCorruption(format!("invalid {what} in database: {detail}"))
}
