//! Seed the database with the sample catalog and the administrator.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SEED_ADMIN_PASSWORD` - Password for a newly created admin identity

use chrono::{DateTime, Utc};
use ecommers_core::config::{database_url, required_env};
use ecommers_core::db::{self, PgCredentialStore, PgProductStore, PgUserStore};
use ecommers_core::store::{CredentialVerifier, ProductStore, UserStore};
use ecommers_core::{Email, Money, Product, ProductId, ProductPatch, Role, User, UserId};
use secrecy::{ExposeSecret, SecretString};

use super::CommandError;

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_NAME: &str = "Super Admin";

struct SampleProduct {
    name: &'static str,
    description: &'static str,
    price: u32,
    stock: u32,
    category: &'static str,
    image_seed: &'static str,
    image_hint: &'static str,
}

const SAMPLE_PRODUCTS: [SampleProduct; 6] = [
    SampleProduct {
        name: "Modern Chair",
        description: "A minimalist chair with a solid oak frame.",
        price: 180,
        stock: 15,
        category: "Furniture",
        image_seed: "product-1",
        image_hint: "modern chair",
    },
    SampleProduct {
        name: "Sleek Laptop",
        description: "A thin, light laptop with an all-day battery.",
        price: 1200,
        stock: 8,
        category: "Electronics",
        image_seed: "product-2",
        image_hint: "laptop computer",
    },
    SampleProduct {
        name: "Ceramic Mugs",
        description: "A set of hand-glazed stoneware mugs.",
        price: 25,
        stock: 50,
        category: "Homeware",
        image_seed: "product-3",
        image_hint: "ceramic mugs",
    },
    SampleProduct {
        name: "Travel Backpack",
        description: "A water-resistant backpack with a padded laptop sleeve.",
        price: 75,
        stock: 30,
        category: "Accessories",
        image_seed: "product-4",
        image_hint: "travel backpack",
    },
    SampleProduct {
        name: "Smart Watch",
        description: "Fitness tracking and notifications on your wrist.",
        price: 250,
        stock: 22,
        category: "Electronics",
        image_seed: "product-5",
        image_hint: "smart watch",
    },
    SampleProduct {
        name: "Noise-Cancelling Headphones",
        description: "Over-ear headphones with active noise cancelling.",
        price: 350,
        stock: 12,
        category: "Electronics",
        image_seed: "product-6",
        image_hint: "headphones",
    },
];

impl SampleProduct {
    fn to_product(&self, now: DateTime<Utc>) -> Product {
        Product::create(
            ProductId::generate(),
            ProductPatch {
                name: Some(self.name.to_owned()),
                description: Some(self.description.to_owned()),
                price: Some(Money::from_dollars(self.price)),
                stock: Some(self.stock),
                category: Some(self.category.to_owned()),
                image_url: Some(format!(
                    "https://picsum.photos/seed/{}/600/800",
                    self.image_seed
                )),
                image_hint: Some(self.image_hint.to_owned()),
            },
            now,
        )
    }
}

/// What a seeding run changed.
#[derive(Debug)]
pub struct SeedReport {
    pub products_removed: u64,
    pub products_inserted: usize,
    pub admin_id: UserId,
    /// False when the identity already existed and only the profile was reset.
    pub admin_created: bool,
}

/// Connect using the environment and seed.
///
/// # Errors
///
/// Returns `CommandError` if configuration is missing or any write fails.
pub async fn run() -> Result<(), CommandError> {
    let _ = dotenvy::dotenv();
    let database_url = database_url("DATABASE_URL")?;
    let admin_password = SecretString::from(required_env("SEED_ADMIN_PASSWORD")?);

    let pool = db::create_pool(&database_url).await?;
    let report = seed(
        &PgProductStore::new(pool.clone()),
        &PgUserStore::new(pool.clone()),
        &PgCredentialStore::new(pool),
        &admin_password,
        Utc::now(),
    )
    .await?;

    tracing::info!(
        removed = report.products_removed,
        inserted = report.products_inserted,
        admin_id = %report.admin_id,
        admin_created = report.admin_created,
        "Seeding complete"
    );
    Ok(())
}

/// Replace the catalog with the sample products and provision the
/// administrator.
///
/// The admin identity is created only if missing; its profile is upserted
/// with the ADMIN role either way, so reruns are safe.
///
/// # Errors
///
/// Returns `CommandError` if a store or credential call fails.
pub async fn seed<P, U, C>(
    products: &P,
    users: &U,
    credentials: &C,
    admin_password: &SecretString,
    now: DateTime<Utc>,
) -> Result<SeedReport, CommandError>
where
    P: ProductStore,
    U: UserStore,
    C: CredentialVerifier,
{
    let products_removed = products.delete_all().await?;
    tracing::info!(count = products_removed, "Removed existing products");

    let email = Email::parse(ADMIN_EMAIL)?;
    let (admin_id, admin_created) = match credentials.find_identity(&email).await? {
        Some(id) => {
            tracing::info!(%id, "Admin identity exists, resetting profile");
            (id, false)
        }
        None => {
            let id = credentials
                .create_identity(&email, admin_password.expose_secret(), ADMIN_NAME)
                .await?;
            tracing::info!(%id, "Created admin identity");
            (id, true)
        }
    };

    users
        .upsert(&User {
            id: admin_id.clone(),
            name: ADMIN_NAME.to_owned(),
            email,
            role: Role::Admin,
        })
        .await?;

    for sample in &SAMPLE_PRODUCTS {
        products.insert(&sample.to_product(now)).await?;
    }
    tracing::info!(count = SAMPLE_PRODUCTS.len(), "Inserted sample products");

    Ok(SeedReport {
        products_removed,
        products_inserted: SAMPLE_PRODUCTS.len(),
        admin_id,
        admin_created,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecommers_core::store::memory::{MemoryCredentials, MemoryProductStore, MemoryUserStore};

    use super::*;

    fn password() -> SecretString {
        SecretString::from("seed-admin-password")
    }

    #[tokio::test]
    async fn test_seed_replaces_catalog() {
        let old = Product::create(ProductId::new("old"), ProductPatch::default(), Utc::now());
        let products = MemoryProductStore::with_products(vec![old]);
        let users = MemoryUserStore::new();
        let credentials = MemoryCredentials::new();

        let report = seed(&products, &users, &credentials, &password(), Utc::now())
            .await
            .unwrap();

        assert_eq!(report.products_removed, 1);
        assert_eq!(report.products_inserted, 6);
        let catalog = products.list().await.unwrap();
        assert_eq!(catalog.len(), 6);
        assert!(catalog.iter().all(|p| p.id != ProductId::new("old")));
        assert!(catalog.iter().any(|p| p.name == "Sleek Laptop"
            && p.price == Money::from_dollars(1200)
            && p.stock == 8));
    }

    #[tokio::test]
    async fn test_seed_provisions_admin() {
        let products = MemoryProductStore::new();
        let users = MemoryUserStore::new();
        let credentials = MemoryCredentials::new();

        let report = seed(&products, &users, &credentials, &password(), Utc::now())
            .await
            .unwrap();

        assert!(report.admin_created);
        let admin = users.get(&report.admin_id).await.unwrap().unwrap();
        assert_eq!(admin.name, ADMIN_NAME);
        assert!(admin.is_admin());
        assert!(users.has_admin_marker(&report.admin_id));

        let email = Email::parse(ADMIN_EMAIL).unwrap();
        let verified = credentials
            .verify(&email, "seed-admin-password")
            .await
            .unwrap();
        assert_eq!(verified, report.admin_id);
    }

    #[tokio::test]
    async fn test_rerun_keeps_existing_identity() {
        let products = MemoryProductStore::new();
        let users = MemoryUserStore::new();
        let credentials = MemoryCredentials::new();
        let existing = credentials.insert(&Email::parse(ADMIN_EMAIL).unwrap(), "original");

        let first = seed(&products, &users, &credentials, &password(), Utc::now())
            .await
            .unwrap();
        let second = seed(&products, &users, &credentials, &password(), Utc::now())
            .await
            .unwrap();

        assert!(!first.admin_created);
        assert_eq!(first.admin_id, existing);
        assert_eq!(second.admin_id, existing);
        assert_eq!(second.products_removed, 6);
        assert_eq!(products.list().await.unwrap().len(), 6);
        assert_eq!(users.len(), 1);
    }
}
