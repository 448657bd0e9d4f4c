//! In-memory stores for tests.
//!
//! Each store can be told to fail its writes so error paths (profile write
//! failing after identity creation, order insert failing at checkout) can
//! be driven deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    CredentialError, CredentialVerifier, ObjectStore, ObjectStoreError, OrderStore, ProductStore,
    StoreError, UserStore,
};
use crate::{Email, Order, OrderId, OrderStatus, Product, ProductId, ProductPatch, Role, User, UserId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected() -> StoreError {
    StoreError::Unavailable("injected failure".to_owned())
}

/// In-memory [`UserStore`].
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<UserId, User>>,
    admin_markers: Mutex<HashSet<UserId>>,
    fail_writes: AtomicBool,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Whether an admin role marker exists for `id`.
    #[must_use]
    pub fn has_admin_marker(&self, id: &UserId) -> bool {
        lock(&self.admin_markers).contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.users).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, user: &User) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        lock(&self.users).insert(user.id.clone(), user.clone());
        let mut markers = lock(&self.admin_markers);
        if user.role == Role::Admin {
            markers.insert(user.id.clone());
        } else {
            markers.remove(&user.id);
        }
        Ok(())
    }
}

impl UserStore for MemoryUserStore {
    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users).get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)
            .values()
            .find(|user| user.email.eq_ignore_case(email.as_str()))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        if lock(&self.users).contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} exists", user.id)));
        }
        self.write(user)
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        self.write(user)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.users).len() as u64)
    }
}

/// In-memory [`ProductStore`]. Keeps insertion order.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Number of write calls that reached the store.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }
}

impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(lock(&self.products).clone())
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(lock(&self.products).iter().find(|p| &p.id == id).cloned())
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut products = lock(&self.products);
        if products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Conflict(format!("product {} exists", product.id)));
        }
        products.push(product.clone());
        Ok(())
    }

    async fn update(&self, id: &ProductId, patch: &ProductPatch) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut products = lock(&self.products);
        let product = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))?;
        product.apply(patch.clone());
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        self.begin_write()?;
        let mut products = lock(&self.products);
        let before = products.len();
        products.retain(|p| &p.id != id);
        Ok(products.len() != before)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.begin_write()?;
        let mut products = lock(&self.products);
        let removed = products.len() as u64;
        products.clear();
        Ok(removed)
    }
}

/// In-memory [`OrderStore`].
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    fail_writes: AtomicBool,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.orders).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        orders
    }
}

impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        lock(&self.orders).push(order.clone());
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(lock(&self.orders).iter().find(|o| &o.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        Ok(Self::newest_first(lock(&self.orders).clone()))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let mine = lock(&self.orders)
            .iter()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(mine))
    }

    async fn set_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        let mut orders = lock(&self.orders);
        let order = orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;
        order.status = status;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Identity {
    id: UserId,
    password: String,
}

/// In-memory [`CredentialVerifier`]. Emails are matched case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    identities: Mutex<HashMap<String, Identity>>,
    fail_deletes: AtomicBool,
    unavailable: AtomicBool,
}

impl MemoryCredentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity directly and return its id.
    pub fn insert(&self, email: &Email, password: &str) -> UserId {
        let id = UserId::generate();
        lock(&self.identities).insert(
            email.as_str().to_ascii_lowercase(),
            Identity {
                id: id.clone(),
                password: password.to_owned(),
            },
        );
        id
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Make every call fail with [`CredentialError::Unavailable`].
    pub fn go_offline(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn contains(&self, id: &UserId) -> bool {
        lock(&self.identities).values().any(|i| &i.id == id)
    }

    fn check_online(&self) -> Result<(), CredentialError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CredentialError::Unavailable("offline".to_owned()));
        }
        Ok(())
    }
}

impl CredentialVerifier for MemoryCredentials {
    async fn verify(&self, email: &Email, password: &str) -> Result<UserId, CredentialError> {
        self.check_online()?;
        match lock(&self.identities).get(&email.as_str().to_ascii_lowercase()) {
            Some(identity) if identity.password == password => Ok(identity.id.clone()),
            _ => Err(CredentialError::Rejected),
        }
    }

    async fn create_identity(
        &self,
        email: &Email,
        password: &str,
        _display_name: &str,
    ) -> Result<UserId, CredentialError> {
        self.check_online()?;
        let key = email.as_str().to_ascii_lowercase();
        let mut identities = lock(&self.identities);
        if identities.contains_key(&key) {
            return Err(CredentialError::AlreadyExists);
        }
        let id = UserId::generate();
        identities.insert(
            key,
            Identity {
                id: id.clone(),
                password: password.to_owned(),
            },
        );
        Ok(id)
    }

    async fn delete_identity(&self, id: &UserId) -> Result<(), CredentialError> {
        self.check_online()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(CredentialError::Unavailable("injected failure".to_owned()));
        }
        lock(&self.identities).retain(|_, identity| &identity.id != id);
        Ok(())
    }

    async fn find_identity(&self, email: &Email) -> Result<Option<UserId>, CredentialError> {
        self.check_online()?;
        Ok(lock(&self.identities)
            .get(&email.as_str().to_ascii_lowercase())
            .map(|identity| identity.id.clone()))
    }
}

/// In-memory [`ObjectStore`].
#[derive(Debug)]
pub struct MemoryObjectStore {
    public_base_url: String,
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    fail_writes: AtomicBool,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: Mutex::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `put` fail with an I/O error.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.objects).keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Content type and bytes stored under `key`.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<(String, Vec<u8>)> {
        lock(&self.objects).get(key).cloned()
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ObjectStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("injected failure").into());
        }
        lock(&self.objects).insert(key.to_owned(), (content_type.to_owned(), bytes.to_vec()));
        Ok(format!("{}/{key}", self.public_base_url.trim_end_matches('/')))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::{Cart, Money};

    fn user(id: &str, email: &str, role: Role) -> User {
        User {
            id: UserId::new(id),
            name: "Test".into(),
            email: Email::parse(email).unwrap(),
            role,
        }
    }

    #[tokio::test]
    async fn test_admin_marker_follows_role() {
        let store = MemoryUserStore::new();
        let admin = user("a1", "admin@admin.com", Role::Admin);
        store.create(&admin).await.unwrap();
        assert!(store.has_admin_marker(&admin.id));

        store
            .upsert(&User {
                role: Role::User,
                ..admin.clone()
            })
            .await
            .unwrap();
        assert!(!store.has_admin_marker(&admin.id));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_user_write_leaves_no_trace() {
        let store = MemoryUserStore::new();
        store.fail_writes();
        let result = store.create(&user("u1", "a@b.co", Role::Admin)).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.is_empty());
        assert!(!store.has_admin_marker(&UserId::new("u1")));
    }

    #[tokio::test]
    async fn test_orders_listed_newest_first() {
        let store = MemoryOrderStore::new();
        let customer = user("u1", "a@b.co", Role::User);
        let now = Utc::now();
        for (id, age) in [("old", 2), ("new", 0), ("mid", 1)] {
            let order = Order::from_cart(
                OrderId::new(id),
                &customer,
                &Cart::new(),
                "x",
                now - TimeDelta::days(age),
            );
            store.insert(&order).await.unwrap();
        }

        let ids: Vec<String> = store
            .list_for_user(&customer.id)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id.into_inner())
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
        assert_eq!(
            store.get(&OrderId::new("mid")).await.unwrap().unwrap().total,
            Money::ZERO
        );
    }

    #[tokio::test]
    async fn test_credentials_match_email_case_insensitively() {
        let creds = MemoryCredentials::new();
        let id = creds.insert(&Email::parse("Ada@Example.com").unwrap(), "pw-123456");

        let verified = creds
            .verify(&Email::parse("ada@example.com").unwrap(), "pw-123456")
            .await
            .unwrap();
        assert_eq!(verified, id);
        assert!(matches!(
            creds
                .create_identity(&Email::parse("ADA@example.com").unwrap(), "x", "Ada")
                .await,
            Err(CredentialError::AlreadyExists)
        ));
    }
}
