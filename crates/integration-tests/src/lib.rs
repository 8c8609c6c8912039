//! Integration tests for Atelier.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process server over TCP, in-memory stores
//! cargo test -p atelier-integration-tests
//!
//! # Also run the PostgreSQL store tests
//! TEST_DATABASE_URL=postgres://localhost/atelier_test \
//!     cargo test -p atelier-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_listing` - Listing, filtering and pagination over HTTP
//! - `listing_session` - Client session against a live server
//! - `admin_products` - Accounts, tokens and admin CRUD
//! - `postgres_store` - `PgProductStore` against a real database (ignored)

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use atelier_client::CatalogClient;
use atelier_core::{Email, NewProduct, Price, Product, Role, Slug};
use atelier_storefront::db::{
    self, MemoryProductStore, MemoryUserStore, PgProductStore, ProductStore, UserStore,
};
use atelier_storefront::{AppState, StorefrontConfig};

/// Signing key for tokens issued by test servers.
pub const TEST_JWT_SECRET: &str = "integration-test-signing-key-0123456789";

const ADMIN_EMAIL: &str = "admin@atelier.test";
const ADMIN_PASSWORD: &str = "admin-password-1";

/// A storefront served on an ephemeral local port with in-memory stores.
pub struct TestServer {
    pub addr: SocketAddr,
    pub products: Arc<MemoryProductStore>,
    pub users: Arc<MemoryUserStore>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and serve the full router in the background.
    pub async fn spawn() -> Self {
        let products = Arc::new(MemoryProductStore::new());
        let users = Arc::new(MemoryUserStore::new());
        let state = AppState::new(
            StorefrontConfig::for_testing(TEST_JWT_SECRET),
            products.clone(),
            users.clone(),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = atelier_storefront::app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            products,
            users,
            handle,
        }
    }

    /// Base URL of the running server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// An unauthenticated client.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&self.base_url()).expect("Failed to create catalog client")
    }

    /// Sign up the admin account, promote it and return a fresh token.
    ///
    /// Safe to call repeatedly; later calls only log in again.
    pub async fn admin_token(&self) -> String {
        let client = self.client();
        let email = Email::parse(ADMIN_EMAIL).expect("valid admin email");
        if self
            .users
            .get_by_email(&email)
            .await
            .expect("Failed to look up admin")
            .is_none()
        {
            client
                .signup("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
                .await
                .expect("Failed to sign up admin");
            self.users
                .set_role(&email, Role::Admin)
                .await
                .expect("Failed to promote admin");
        }
        client
            .login(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("Failed to log in admin")
    }

    /// A client holding an admin token.
    pub async fn admin_client(&self) -> CatalogClient {
        let token = self.admin_token().await;
        self.client().with_token(token)
    }

    /// Insert products directly into the store, in order.
    pub async fn seed(&self, products: &[NewProduct]) -> Vec<Product> {
        let mut created = Vec::with_capacity(products.len());
        for product in products {
            created.push(
                self.products
                    .create(product)
                    .await
                    .expect("Failed to seed product"),
            );
        }
        created
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Connect to `TEST_DATABASE_URL`, run migrations and empty the catalog.
///
/// Returns `None` when the variable is unset.
pub async fn postgres_store() -> Option<PgProductStore> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool: PgPool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to TEST_DATABASE_URL");

    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let store = PgProductStore::new(pool);
    store.clear().await.expect("Failed to clear products");
    Some(store)
}

/// A valid product in category `Tops`, color `Black`, size `M`.
#[must_use]
pub fn new_product(name: &str, price: u32) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        slug: Slug::from_name(name).expect("name produces a slug"),
        price: Price::from_units(price),
        brand: "Atelier".to_owned(),
        image: "/images/test.png".to_owned(),
        category: "Tops".to_owned(),
        dress_style: "Casual".to_owned(),
        colors: vec!["Black".to_owned()],
        sizes: vec!["M".to_owned()],
        description: format!("{name} for integration tests"),
        popularity: 0,
    }
}
