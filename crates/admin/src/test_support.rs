//! Shared fixtures for router and extractor tests.

use std::path::Path;

use sqlx::postgres::PgPoolOptions;

use crate::config::{AdminConfig, test_config};
use crate::state::AppState;

/// State over a lazy pool. Routes that never query the database can be
/// exercised without one.
pub(crate) fn test_state() -> AppState {
    state_for(test_config())
}

/// Like [`test_state`], with uploads written below `uploads_dir`.
pub(crate) fn test_state_with_uploads(uploads_dir: &Path) -> AppState {
    let mut config = test_config();
    config.uploads_dir = uploads_dir.to_path_buf();
    state_for(config)
}

fn state_for(config: AdminConfig) -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/ecommers_test")
        .expect("static test database url parses");
    AppState::new(config, pool)
}
