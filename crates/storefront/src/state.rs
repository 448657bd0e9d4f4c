//! Application state shared across handlers.

use std::sync::Arc;

use ecommers_core::db::{PgCredentialStore, PgOrderStore, PgProductStore, PgUserStore};
use ecommers_core::session::{SessionCookie, SessionSigner};
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{AuthService, CheckoutService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, the session signer and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    users: PgUserStore,
    products: PgProductStore,
    orders: PgOrderStore,
    credentials: PgCredentialStore,
    signer: SessionSigner,
    cookie: SessionCookie,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let signer = SessionSigner::new(config.session_secret.clone());
        let cookie = config.session_cookie();

        Self {
            inner: Arc::new(AppStateInner {
                users: PgUserStore::new(pool.clone()),
                products: PgProductStore::new(pool.clone()),
                orders: PgOrderStore::new(pool.clone()),
                credentials: PgCredentialStore::new(pool.clone()),
                pool,
                signer,
                cookie,
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
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

    /// Session token signer, shared with the admin binary through the secret.
    #[must_use]
    pub fn signer(&self) -> &SessionSigner {
        &self.inner.signer
    }

    #[must_use]
    pub fn session_cookie(&self) -> &SessionCookie {
        &self.inner.cookie
    }

    /// Login and registration service over the Postgres adapters.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_, PgCredentialStore, PgUserStore> {
        AuthService::new(&self.inner.credentials, &self.inner.users, &self.inner.signer)
    }

    /// Order placement service over the Postgres adapter.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_, PgOrderStore> {
        CheckoutService::new(&self.inner.orders)
    }
}
