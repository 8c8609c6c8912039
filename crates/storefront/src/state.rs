//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{
    MemoryProductStore, MemoryUserStore, PgProductStore, PgUserStore, ProductStore, UserStore,
};
use crate::services::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, configuration and token service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: Arc<dyn ProductStore>,
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AppState {
    /// Create state over explicit stores.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                users,
                tokens,
            }),
        }
    }

    /// Create state backed by `PostgreSQL`.
    #[must_use]
    pub fn with_pool(config: StorefrontConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgProductStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool)),
        )
    }

    /// Create state backed by empty in-memory stores.
    #[must_use]
    pub fn in_memory(config: StorefrontConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryProductStore::new()),
            Arc::new(MemoryUserStore::new()),
        )
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the product store.
    #[must_use]
    pub fn products(&self) -> &dyn ProductStore {
        self.inner.products.as_ref()
    }

    /// Get the account store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get the bearer token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
