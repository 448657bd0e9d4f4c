//! Shared fixtures for router and extractor tests.

use sqlx::postgres::PgPoolOptions;

use crate::config::test_config;
use crate::state::AppState;

/// State over a lazy pool. Routes that never query the database can be
/// exercised without one.
pub(crate) fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/ecommers_test")
        .expect("static test database url parses");
    AppState::new(test_config(), pool)
}
