//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ecv-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migrations live in `crates/core/migrations/` and are embedded at build
//! time, so the binary needs no files at run time.

use ecommers_core::config::database_url;
use ecommers_core::db::{self, MIGRATOR};

use super::CommandError;

/// Apply every pending migration.
///
/// # Errors
///
/// Returns `CommandError` if the URL is missing, the database is
/// unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let _ = dotenvy::dotenv();
    let database_url = database_url("DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
