//! Process-local stores.
//!
//! These evaluate [`ProductQuery`] directly with the predicate and sort
//! comparators from `atelier_core`, so they agree with the SQL rendering on
//! every listing. Data is lost when the process exits.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use atelier_core::query::Predicate;
use atelier_core::{Email, NewProduct, Product, ProductId, ProductQuery, Role, Slug, UserId};

use super::{ProductStore, RepositoryError, UserRecord, UserStore};

#[derive(Debug)]
struct Table<T> {
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

// Derived `Default` would demand `T: Default`.
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    const fn allocate(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory product store.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    table: RwLock<Table<Product>>,
}

impl MemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert fully-formed products, keeping their ids and timestamps.
    ///
    /// Later inserts with an existing id replace the earlier row.
    pub fn insert_all(&self, products: impl IntoIterator<Item = Product>) {
        let mut table = write(&self.table);
        for product in products {
            let id = product.id.as_i32();
            table.next_id = table.next_id.max(id);
            table.rows.insert(id, product);
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn count(&self, predicate: &Predicate) -> Result<u64, RepositoryError> {
        let table = read(&self.table);
        Ok(table.rows.values().filter(|p| predicate.matches(p)).count() as u64)
    }

    async fn fetch_window(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let table = read(&self.table);
        let (items, _) = query.apply(table.rows.values());
        Ok(items)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(read(&self.table).rows.get(&id.as_i32()).cloned())
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        Ok(read(&self.table)
            .rows
            .values()
            .find(|p| &p.slug == slug)
            .cloned())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut table = write(&self.table);
        if table.rows.values().any(|p| p.slug == product.slug) {
            return Err(RepositoryError::Conflict(
                "A product with this slug already exists".to_owned(),
            ));
        }

        let id = table.allocate();
        let now = Utc::now();
        let created = Product {
            id: ProductId::new(id),
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price,
            brand: product.brand.clone(),
            image: product.image.clone(),
            category: product.category.clone(),
            dress_style: product.dress_style.clone(),
            colors: product.colors.clone(),
            sizes: product.sizes.clone(),
            description: product.description.clone(),
            popularity: product.popularity,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, product: &Product) -> Result<Product, RepositoryError> {
        let mut table = write(&self.table);
        let existing = table
            .rows
            .get_mut(&product.id.as_i32())
            .ok_or(RepositoryError::NotFound)?;

        let updated = Product {
            slug: existing.slug.clone(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..product.clone()
        };
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        write(&self.table)
            .rows
            .remove(&id.as_i32())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut table = write(&self.table);
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// In-memory account store.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: RwLock<Table<UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(read(&self.table)
            .rows
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(read(&self.table).rows.get(&id.as_i32()).cloned())
    }

    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserRecord, RepositoryError> {
        let mut table = write(&self.table);
        if table.rows.values().any(|u| &u.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = table.allocate();
        let user = UserRecord {
            id: UserId::new(id),
            name: name.to_owned(),
            email: email.clone(),
            role: Role::User,
            password_hash: password_hash.to_owned(),
        };
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<UserRecord, RepositoryError> {
        let mut table = write(&self.table);
        let user = table
            .rows
            .values_mut()
            .find(|u| &u.email == email)
            .ok_or(RepositoryError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }
}
