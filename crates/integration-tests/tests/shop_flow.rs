//! End-to-end shop flows over the in-memory stores.
//!
//! The storefront and admin services share one set of stores here, the way
//! both binaries share one database in production.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use ecommers_admin::services::{AdminError, CatalogService, ImageUpload, OrderAdminService};
use ecommers_core::store::memory::{
    MemoryCredentials, MemoryObjectStore, MemoryOrderStore, MemoryProductStore, MemoryUserStore,
};
use ecommers_core::store::{OrderStore, ProductStore};
use ecommers_core::{Cart, Money, OrderStatus, ProductInput, ProductPatch, Role};
use ecommers_integration_tests::{product, test_signer};
use ecommers_storefront::services::{AuthService, CheckoutService, DEMO_SHIPPING_ADDRESS};

struct Shop {
    credentials: MemoryCredentials,
    users: MemoryUserStore,
    products: MemoryProductStore,
    orders: MemoryOrderStore,
    images: MemoryObjectStore,
}

impl Shop {
    fn new() -> Self {
        Self {
            credentials: MemoryCredentials::new(),
            users: MemoryUserStore::new(),
            products: MemoryProductStore::with_products(vec![
                product("lamp", 40, 5),
                product("mug", 12, 20),
                product("rug", 90, 0),
            ]),
            orders: MemoryOrderStore::new(),
            images: MemoryObjectStore::new("http://localhost:3000/uploads"),
        }
    }
}

// =============================================================================
// Customer Flow
// =============================================================================

#[tokio::test]
async fn test_register_shop_and_check_out() {
    let shop = Shop::new();
    let signer = test_signer();
    let auth = AuthService::new(&shop.credentials, &shop.users, &signer);

    let signed_in = auth
        .register("Ada Lovelace", "ada@example.com", "correct-horse")
        .await
        .unwrap();
    assert_eq!(signed_in.user.role, Role::User);

    let mut cart = Cart::new();
    let lamp = shop.products.get(&"lamp".into()).await.unwrap().unwrap();
    let mug = shop.products.get(&"mug".into()).await.unwrap().unwrap();
    cart.add(lamp.clone());
    cart.add(lamp);
    cart.add(mug);
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.total(), Money::from_dollars(92));

    let order_id = CheckoutService::new(&shop.orders)
        .create_order(Some(&signed_in.user), &cart)
        .await
        .unwrap();

    let order = shop.orders.get(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Money::from_dollars(92));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.customer_email, signed_in.user.email);
    assert_eq!(order.shipping_address, DEMO_SHIPPING_ADDRESS);

    // The session survives a fresh login with the same password
    let again = auth.login("ada@example.com", "correct-horse").await.unwrap();
    assert_eq!(again.user.id, signed_in.user.id);
    let history = shop.orders.list_for_user(&again.user.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_order_snapshot_outlives_catalog_changes() {
    let shop = Shop::new();
    let signer = test_signer();
    let customer = AuthService::new(&shop.credentials, &shop.users, &signer)
        .register("Ada", "ada@example.com", "correct-horse")
        .await
        .unwrap()
        .user;

    let mut cart = Cart::new();
    cart.add(shop.products.get(&"mug".into()).await.unwrap().unwrap());
    let order_id = CheckoutService::new(&shop.orders)
        .create_order(Some(&customer), &cart)
        .await
        .unwrap();

    let admin = ecommers_integration_tests::user("boss", "boss@example.com", Role::Admin);
    let catalog = CatalogService::new(&shop.products, &shop.images);
    catalog
        .upsert_product(
            Some(&admin),
            ProductInput {
                id: Some("mug".into()),
                fields: ProductPatch {
                    price: Some(Money::from_dollars(99)),
                    ..ProductPatch::default()
                },
            },
        )
        .await
        .unwrap();
    catalog
        .delete_product(Some(&admin), &"mug".into())
        .await
        .unwrap();

    let order = shop.orders.get(&order_id).await.unwrap().unwrap();
    let line = order.items.first().unwrap();
    assert_eq!(line.price, Money::from_dollars(12));
    assert_eq!(order.total, Money::from_dollars(12));
}

// =============================================================================
// Admin Flow
// =============================================================================

#[tokio::test]
async fn test_designated_admin_manages_orders() {
    let shop = Shop::new();
    let signer = test_signer();
    let auth = AuthService::new(&shop.credentials, &shop.users, &signer);

    let customer = auth
        .register("Ada", "ada@example.com", "correct-horse")
        .await
        .unwrap()
        .user;
    let admin = auth
        .register("Super Admin", "Admin@Admin.com", "admin-password")
        .await
        .unwrap()
        .user;
    assert!(admin.is_admin());
    assert!(shop.users.has_admin_marker(&admin.id));

    let mut cart = Cart::new();
    cart.add(shop.products.get(&"lamp".into()).await.unwrap().unwrap());
    let order_id = CheckoutService::new(&shop.orders)
        .create_order(Some(&customer), &cart)
        .await
        .unwrap();

    let order_admin = OrderAdminService::new(&shop.orders);
    let refused = order_admin
        .update_order_status(Some(&customer), &order_id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(refused, AdminError::Unauthorized));

    order_admin
        .update_order_status(Some(&admin), &order_id, OrderStatus::Shipped)
        .await
        .unwrap();
    let order = shop.orders.get(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_admin_session_verifies_across_binaries() {
    let shop = Shop::new();
    let storefront_signer = test_signer();
    let admin_signer = test_signer();

    let signed_in = AuthService::new(&shop.credentials, &shop.users, &storefront_signer)
        .register("Super Admin", "admin@admin.com", "admin-password")
        .await
        .unwrap();

    let resolved = admin_signer.resolve(Some(&signed_in.token.value)).unwrap();
    assert_eq!(resolved, signed_in.user);
    assert!(resolved.is_admin());

    let other = ecommers_core::session::SessionSigner::new(secrecy::SecretString::from(
        "a-completely-different-signing-key-value",
    ));
    assert_eq!(other.resolve(Some(&signed_in.token.value)), None);
}

#[tokio::test]
async fn test_new_product_reaches_storefront_listing() {
    let shop = Shop::new();
    let admin = ecommers_integration_tests::user("boss", "boss@example.com", Role::Admin);
    let catalog = CatalogService::new(&shop.products, &shop.images);

    let url = catalog
        .upload_product_image(
            Some(&admin),
            ImageUpload {
                file_name: "chair.jpg".to_owned(),
                content_type: "image/jpeg".to_owned(),
                bytes: vec![0xFF, 0xD8, 0xFF],
            },
        )
        .await
        .unwrap();

    let id = catalog
        .upsert_product(
            Some(&admin),
            ProductInput {
                id: None,
                fields: ProductPatch {
                    name: Some("Modern Chair".to_owned()),
                    description: Some("A minimalist oak chair.".to_owned()),
                    price: Some(Money::from_dollars(180)),
                    stock: Some(15),
                    category: Some("Furniture".to_owned()),
                    image_url: Some(url.clone()),
                    image_hint: None,
                },
            },
        )
        .await
        .unwrap();

    let listing = shop.products.list().await.unwrap();
    let chair = listing.iter().find(|p| p.id == id).unwrap();
    assert_eq!(chair.image_url, url);
    assert!(chair.in_stock());
    assert!(chair.created_at <= Utc::now());
}
