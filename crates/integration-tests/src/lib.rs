//! Integration tests for E-Commers V.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory flows, no services needed
//! cargo test -p ecommers-integration-tests
//!
//! # Smoke tests against running servers
//! STOREFRONT_URL=http://localhost:3000 ADMIN_URL=http://localhost:3001 \
//!     cargo test -p ecommers-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `shop_flow` - Storefront and admin services over the memory stores
//! - `smoke` - HTTP checks against live binaries

use chrono::Utc;
use ecommers_core::session::SessionSigner;
use ecommers_core::{Email, Money, Product, ProductId, ProductPatch, Role, User, UserId};
use secrecy::SecretString;

/// Secret shared by the storefront and admin signers in tests.
pub const TEST_SESSION_SECRET: &str = "k9Vq2mXw7LzR4tYb8NcH3jPf6GsD1aEu";

/// A signer keyed with [`TEST_SESSION_SECRET`].
#[must_use]
pub fn test_signer() -> SessionSigner {
    SessionSigner::new(SecretString::from(TEST_SESSION_SECRET))
}

/// An in-stock product.
#[must_use]
pub fn product(id: &str, dollars: u32, stock: u32) -> Product {
    Product::create(
        ProductId::new(id),
        ProductPatch {
            name: Some(id.to_owned()),
            description: Some(format!("The {id} product.")),
            price: Some(Money::from_dollars(dollars)),
            stock: Some(stock),
            category: Some("Test".to_owned()),
            ..ProductPatch::default()
        },
        Utc::now(),
    )
}

/// A profile with the given role.
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
#[allow(clippy::expect_used)]
pub fn user(id: &str, email: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        name: id.to_owned(),
        email: Email::parse(email).expect("test email is valid"),
        role,
    }
}

/// Live servers for the smoke tests.
pub struct TestContext {
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub admin_url: String,
}

impl TestContext {
    /// Read `STOREFRONT_URL` and `ADMIN_URL`, defaulting to the local ports.
    ///
    /// The client keeps cookies and does not follow redirects, so tests
    /// can assert on `Location`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn from_env() -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            storefront_url: std::env::var("STOREFRONT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_owned()),
            admin_url: std::env::var("ADMIN_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_owned()),
        }
    }

    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }
}
