//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Products
//! GET    /api/products         - Filtered, sorted, paginated listing
//! POST   /api/products         - Create product (admin)
//! PUT    /api/products         - Update product, id in body (admin)
//! DELETE /api/products?id=     - Delete product (admin)
//! GET    /api/products/by-slug?slug= - Product detail
//!
//! # Accounts
//! POST /api/auth/signup        - Register
//! POST /api/auth/login         - Exchange credentials for a bearer token
//! GET  /api/protected          - Token check (any role)
//! ```

pub mod auth;
pub mod health;
pub mod products;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor whose rejections use the API error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::list)
                .post(products::create)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/by-slug", get(products::by_slug))
}

/// Create the account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/protected", get(auth::protected))
}

/// Create all routes for the catalog API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(
            "/api",
            Router::new().merge(product_routes()).merge(auth_routes()),
        )
}
