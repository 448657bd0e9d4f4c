//! Application state shared across handlers.

use std::sync::Arc;

use ecommers_core::db::{PgOrderStore, PgProductStore, PgUserStore};
use ecommers_core::session::{SessionCookie, SessionSigner};
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{CatalogService, OrderAdminService};
use crate::storage::LocalObjectStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    users: PgUserStore,
    products: PgProductStore,
    orders: PgOrderStore,
    images: LocalObjectStore,
    signer: SessionSigner,
    cookie: SessionCookie,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let signer = SessionSigner::new(config.session_secret.clone());
        let cookie = config.session_cookie();
        let images = LocalObjectStore::new(&config.uploads_dir, &config.uploads_public_url);

        Self {
            inner: Arc::new(AppStateInner {
                users: PgUserStore::new(pool.clone()),
                products: PgProductStore::new(pool.clone()),
                orders: PgOrderStore::new(pool.clone()),
                pool,
                images,
                signer,
                cookie,
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn users(&self) -> &PgUserStore {
        &self.inner.users
    }

    #[must_use]
    pub fn products(&self) -> &PgProductStore {
        &self.inner.products
    }

    #[must_use]
    pub fn orders(&self) -> &PgOrderStore {
        &self.inner.orders
    }

    /// Verifies tokens minted by the storefront.
    #[must_use]
    pub fn signer(&self) -> &SessionSigner {
        &self.inner.signer
    }

    #[must_use]
    pub fn session_cookie(&self) -> &SessionCookie {
        &self.inner.cookie
    }

    /// Catalog writes over Postgres and the uploads directory.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_, PgProductStore, LocalObjectStore> {
        CatalogService::new(&self.inner.products, &self.inner.images)
    }

    #[must_use]
    pub fn order_admin(&self) -> OrderAdminService<'_, PgOrderStore> {
        OrderAdminService::new(&self.inner.orders)
    }
}
