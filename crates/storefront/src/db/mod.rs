//! Catalog persistence.
//!
//! # Schema: `catalog`
//!
//! ## Tables
//!
//! - `catalog.product` - Products served by the listing and detail endpoints
//! - `catalog.user` - Accounts with Argon2 password hashes and a role
//!
//! # Stores
//!
//! Handlers never touch a pool directly. They go through the [`ProductStore`]
//! and [`UserStore`] traits, which have two implementations:
//!
//! - [`PgProductStore`] / [`PgUserStore`] - `PostgreSQL` via sqlx
//! - [`MemoryProductStore`] / [`MemoryUserStore`] - process-local, used by
//!   tests and demos
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use atelier_core::query::Predicate;
use atelier_core::{Email, NewProduct, Product, ProductId, ProductQuery, Role, Slug, UserId};

pub mod memory;
pub mod products;
pub mod users;

pub use memory::{MemoryProductStore, MemoryUserStore};
pub use products::PgProductStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique-constraint violations to [`RepositoryError::Conflict`].
    pub(crate) fn from_insert(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// An account as stored, including its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub password_hash: String,
}

/// Product persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Number of products matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> Result<u64, RepositoryError>;

    /// The rows selected by `query`'s predicate, ordering and window.
    async fn fetch_window(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product. Duplicate slugs yield [`RepositoryError::Conflict`].
    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Overwrite the mutable fields of an existing product and bump
    /// `updated_at`. Missing products yield [`RepositoryError::NotFound`].
    async fn update(&self, product: &Product) -> Result<Product, RepositoryError>;

    /// Delete a product. Missing products yield [`RepositoryError::NotFound`].
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;

    /// Remove every product, returning how many were removed.
    async fn clear(&self) -> Result<u64, RepositoryError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError>;

    /// Create a `user`-role account. Duplicate emails yield
    /// [`RepositoryError::Conflict`].
    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserRecord, RepositoryError>;

    /// Change an account's role. Missing accounts yield
    /// [`RepositoryError::NotFound`].
    async fn set_role(&self, email: &Email, role: Role) -> Result<UserRecord, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
