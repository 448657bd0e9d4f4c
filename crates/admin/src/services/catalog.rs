//! Product catalog administration.
//!
//! Every write checks the caller's role before touching a store.

use chrono::{DateTime, Utc};
use ecommers_core::store::{ObjectStore, ProductStore};
use ecommers_core::{FieldErrors, Product, ProductId, ProductInput, ProductPatch, User};
use rand::Rng;
use tracing::instrument;

use super::{AdminError, require_admin};

const MIN_NAME_LENGTH: usize = 3;
const MIN_DESCRIPTION_LENGTH: usize = 10;

/// Prefix under which product images are stored.
pub const PRODUCT_IMAGE_PREFIX: &str = "product-images";

/// A file received from the upload form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Catalog writes: create, update, delete and image upload.
pub struct CatalogService<'a, P, S> {
    products: &'a P,
    objects: &'a S,
}

impl<'a, P, S> CatalogService<'a, P, S>
where
    P: ProductStore,
    S: ObjectStore,
{
    #[must_use]
    pub const fn new(products: &'a P, objects: &'a S) -> Self {
        Self { products, objects }
    }

    /// Create a product, or partially update it when `input.id` is set.
    ///
    /// Field checks belong to the form layer ([`validate_product_input`]);
    /// this path trusts its caller beyond the role check.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Unauthorized` for non-admin callers and
    /// `AdminError::Store` if the write fails (including `NotFound` when
    /// updating a product that does not exist).
    #[instrument(skip_all, fields(product_id = ?input.id))]
    pub async fn upsert_product(
        &self,
        caller: Option<&User>,
        input: ProductInput,
    ) -> Result<ProductId, AdminError> {
        let admin = require_admin(caller)?;

        let id = match input.id {
            Some(id) => {
                self.products.update(&id, &input.fields).await?;
                id
            }
            None => {
                let product = Product::create(ProductId::generate(), input.fields, Utc::now());
                self.products.insert(&product).await?;
                product.id
            }
        };

        tracing::info!(product_id = %id, admin_id = %admin.id, "Product saved");
        Ok(id)
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Unauthorized` for non-admin callers and
    /// `AdminError::Store` if the delete fails.
    #[instrument(skip(self, caller))]
    pub async fn delete_product(
        &self,
        caller: Option<&User>,
        id: &ProductId,
    ) -> Result<bool, AdminError> {
        let admin = require_admin(caller)?;
        let deleted = self.products.delete(id).await?;
        if deleted {
            tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
        }
        Ok(deleted)
    }

    /// Store a product image under a fresh, collision-resistant key and
    /// return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Unauthorized` for non-admin callers,
    /// `AdminError::MissingFile` for an empty upload, and
    /// `AdminError::Upload` if storage fails.
    #[instrument(skip_all, fields(file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload_product_image(
        &self,
        caller: Option<&User>,
        upload: ImageUpload,
    ) -> Result<String, AdminError> {
        require_admin(caller)?;
        if upload.bytes.is_empty() {
            return Err(AdminError::MissingFile);
        }

        let suffix = rand::rng().random_range(0..1_000_000_000);
        let key = image_key(&upload.file_name, Utc::now(), suffix);
        let url = self
            .objects
            .put(&key, &upload.content_type, &upload.bytes)
            .await?;

        tracing::info!(key = %key, "Product image uploaded");
        Ok(url)
    }
}

/// Object key for an uploaded image:
/// `product-images/{unix_millis}-{suffix}.{ext}`.
///
/// The extension is taken from the original name, lower-cased, and left
/// off when the name has none.
#[must_use]
pub fn image_key(file_name: &str, now: DateTime<Utc>, suffix: u32) -> String {
    let millis = now.timestamp_millis();
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{PRODUCT_IMAGE_PREFIX}/{millis}-{suffix}.{ext}"),
        None => format!("{PRODUCT_IMAGE_PREFIX}/{millis}-{suffix}"),
    }
}

/// Form-level checks for product input.
///
/// New products need a name and description; updates are checked only on
/// the fields they carry. Price and stock cannot be negative by type.
///
/// # Errors
///
/// Returns `AdminError::Validation` listing every failing field.
pub fn validate_product_input(input: &ProductInput) -> Result<(), AdminError> {
    let mut errors = FieldErrors::new();
    let creating = input.id.is_none();
    let ProductPatch {
        name,
        description,
        price,
        ..
    } = &input.fields;

    match name {
        Some(name) if name.trim().chars().count() < MIN_NAME_LENGTH => {
            errors.add("name", "Name must be at least 3 characters.");
        }
        None if creating => errors.add("name", "Name is required."),
        _ => {}
    }

    match description {
        Some(text) if text.trim().chars().count() < MIN_DESCRIPTION_LENGTH => {
            errors.add("description", "Description must be at least 10 characters.");
        }
        None if creating => errors.add("description", "Description is required."),
        _ => {}
    }

    if price.is_some_and(|price| !price.is_whole_cents()) {
        errors.add("price", "Price can have at most 2 decimal places.");
    }

    if !creating && input.fields.is_empty() {
        errors.add("id", "Nothing to update.");
    }

    errors.into_result().map_err(AdminError::Validation)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use ecommers_core::store::StoreError;
    use ecommers_core::store::memory::{MemoryObjectStore, MemoryProductStore};
    use ecommers_core::{Email, Money, Role, UserId};
    use rust_decimal::Decimal;

    use super::*;

    fn user(role: Role) -> User {
        User {
            id: UserId::new("caller"),
            name: "Caller".into(),
            email: Email::parse("caller@example.com").unwrap(),
            role,
        }
    }

    fn new_product_input() -> ProductInput {
        ProductInput {
            id: None,
            fields: ProductPatch {
                name: Some("Desk Lamp".into()),
                description: Some("Warm light for late nights.".into()),
                price: Some(Money::from_dollars(40)),
                stock: Some(12),
                category: Some("Lighting".into()),
                ..ProductPatch::default()
            },
        }
    }

    struct Fixture {
        products: MemoryProductStore,
        objects: MemoryObjectStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                products: MemoryProductStore::new(),
                objects: MemoryObjectStore::new("http://localhost:3000/uploads"),
            }
        }

        fn service(&self) -> CatalogService<'_, MemoryProductStore, MemoryObjectStore> {
            CatalogService::new(&self.products, &self.objects)
        }
    }

    #[tokio::test]
    async fn test_non_admin_cannot_upsert() {
        let fx = Fixture::new();
        for caller in [None, Some(user(Role::User))] {
            let err = fx
                .service()
                .upsert_product(caller.as_ref(), new_product_input())
                .await
                .unwrap_err();
            assert!(matches!(err, AdminError::Unauthorized));
            assert_eq!(err.to_string(), "Unauthorized");
        }
        assert_eq!(fx.products.write_count(), 0);
    }

    #[tokio::test]
    async fn test_create_then_partial_update() {
        let fx = Fixture::new();
        let admin = user(Role::Admin);

        let id = fx
            .service()
            .upsert_product(Some(&admin), new_product_input())
            .await
            .unwrap();

        let update = ProductInput {
            id: Some(id.clone()),
            fields: ProductPatch {
                stock: Some(0),
                ..ProductPatch::default()
            },
        };
        let same_id = fx.service().upsert_product(Some(&admin), update).await.unwrap();
        assert_eq!(same_id, id);

        let stored = fx.products.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Desk Lamp");
        assert_eq!(stored.stock, 0);
        assert_eq!(stored.price, Money::from_dollars(40));
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let fx = Fixture::new();
        let input = ProductInput {
            id: Some(ProductId::new("ghost")),
            fields: ProductPatch {
                stock: Some(1),
                ..ProductPatch::default()
            },
        };
        let err = fx
            .service()
            .upsert_product(Some(&user(Role::Admin)), input)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let fx = Fixture::new();
        let admin = user(Role::Admin);
        let id = fx
            .service()
            .upsert_product(Some(&admin), new_product_input())
            .await
            .unwrap();

        assert!(fx.service().delete_product(Some(&admin), &id).await.unwrap());
        assert!(!fx.service().delete_product(Some(&admin), &id).await.unwrap());

        let err = fx
            .service()
            .delete_product(Some(&user(Role::User)), &id)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Unauthorized));
    }

    #[tokio::test]
    async fn test_upload_stores_under_product_images() {
        let fx = Fixture::new();
        let upload = ImageUpload {
            file_name: "Lamp.JPG".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        };

        let url = fx
            .service()
            .upload_product_image(Some(&user(Role::Admin)), upload)
            .await
            .unwrap();

        let keys = fx.objects.keys();
        assert_eq!(keys.len(), 1);
        let key = keys.first().unwrap();
        assert!(key.starts_with("product-images/"));
        assert!(key.ends_with(".jpg"));
        assert_eq!(url, format!("http://localhost:3000/uploads/{key}"));
        assert_eq!(fx.objects.object(key).unwrap().0, "image/jpeg");
    }

    #[tokio::test]
    async fn test_upload_requires_admin_and_file() {
        let fx = Fixture::new();
        let upload = ImageUpload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1],
        };

        let err = fx
            .service()
            .upload_product_image(Some(&user(Role::User)), upload.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Unauthorized));

        let empty = ImageUpload {
            bytes: Vec::new(),
            ..upload
        };
        let err = fx
            .service()
            .upload_product_image(Some(&user(Role::Admin)), empty)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::MissingFile));
        assert!(fx.objects.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_storage_failure() {
        let fx = Fixture::new();
        fx.objects.fail_writes();
        let upload = ImageUpload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1],
        };
        let err = fx
            .service()
            .upload_product_image(Some(&user(Role::Admin)), upload)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Upload(_)));
    }

    #[test]
    fn test_image_key() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            image_key("photo.PNG", now, 42),
            "product-images/1700000000123-42.png"
        );
        assert_eq!(
            image_key("archive.tar.gz", now, 7),
            "product-images/1700000000123-7.gz"
        );
        assert_eq!(image_key("noext", now, 7), "product-images/1700000000123-7");
        assert_eq!(image_key("trailing.", now, 7), "product-images/1700000000123-7");
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_product_input(&new_product_input()).is_ok());

        let mut input = new_product_input();
        input.fields.name = Some("ab".into());
        input.fields.description = None;
        let Err(AdminError::Validation(errors)) = validate_product_input(&input) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("name"), Some("Name must be at least 3 characters."));
        assert_eq!(errors.get("description"), Some("Description is required."));
    }

    #[test]
    fn test_validate_update_checks_present_fields_only() {
        let input = ProductInput {
            id: Some(ProductId::new("p1")),
            fields: ProductPatch {
                price: Some(Money::from_dollars(5)),
                ..ProductPatch::default()
            },
        };
        assert!(validate_product_input(&input).is_ok());

        let empty = ProductInput {
            id: Some(ProductId::new("p1")),
            fields: ProductPatch::default(),
        };
        assert!(validate_product_input(&empty).is_err());
    }

    #[test]
    fn test_validate_price_precision() {
        let priced = |amount: Decimal| ProductInput {
            id: Some(ProductId::new("p1")),
            fields: ProductPatch {
                price: Some(Money::new(amount).unwrap()),
                ..ProductPatch::default()
            },
        };

        assert!(validate_product_input(&priced(Decimal::new(1999, 2))).is_ok());
        assert!(validate_product_input(&priced(Decimal::new(19_9900, 4))).is_ok());

        let Err(AdminError::Validation(errors)) =
            validate_product_input(&priced(Decimal::new(19_999, 3)))
        else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("price"),
            Some("Price can have at most 2 decimal places.")
        );
    }
}
