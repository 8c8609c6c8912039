//! Atelier Storefront - Catalog HTTP API.
//!
//! This crate provides the catalog API as a library so the binary, the CLI
//! and the integration tests share one router and one set of stores.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - `PostgreSQL` via sqlx for products and accounts
//! - In-memory stores with the same traits for tests and demos
//! - HS256 bearer tokens for protected and admin routes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

pub use config::StorefrontConfig;
pub use state::AppState;

/// Build the complete application router over `state`.
///
/// Layers, outermost first: Sentry, CORS (when configured), request
/// tracing, request id.
pub fn app(state: AppState) -> Router {
    let cors = state.config().cors_origin.as_deref().and_then(cors_layer);

    let router = routes::routes()
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS for a single browser origin.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let Ok(origin) = HeaderValue::from_str(origin) else {
        tracing::warn!(origin, "ignoring unparsable CORS origin");
        return None;
    };

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use atelier_core::{Email, Role};

    use super::*;
    use crate::db::{MemoryProductStore, MemoryUserStore, UserStore};

    const SECRET: &str = "router-tests-signing-key-with-32+chars";

    struct Harness {
        router: Router,
        users: Arc<MemoryUserStore>,
    }

    fn harness() -> Harness {
        let users = Arc::new(MemoryUserStore::new());
        let state = AppState::new(
            StorefrontConfig::for_testing(SECRET),
            Arc::new(MemoryProductStore::new()),
            users.clone(),
        );
        Harness {
            router: app(state),
            users,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn admin_token(h: &Harness) -> String {
        let signup = json!({"name": "Ada", "email": "ada@example.com", "password": "correct horse"});
        let (status, _) = send(&h.router, json_request("POST", "/api/auth/signup", None, &signup)).await;
        assert_eq!(status, StatusCode::OK);

        h.users
            .set_role(&Email::parse("ada@example.com").unwrap(), Role::Admin)
            .await
            .unwrap();

        let login = json!({"email": "ada@example.com", "password": "correct horse"});
        let (status, body) = send(&h.router, json_request("POST", "/api/auth/login", None, &login)).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }

    fn product_body(name: &str, slug: &str, price: u32) -> Value {
        json!({
            "name": name,
            "slug": slug,
            "price": price,
            "brand": "Atelier",
            "image": "/images/p.jpg",
            "category": "Tops",
            "dressStyle": "Casual",
            "colors": ["Black"],
            "sizes": ["M"],
            "description": format!("{name} description"),
        })
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let h = harness();
        let response = h.router.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));

        let response = h.router.clone().oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let h = harness();
        let (status, body) = send(&h.router, get("/api/products")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["totalPages"], 0);
        assert_eq!(body["totalProducts"], 0);
    }

    #[tokio::test]
    async fn test_inverted_price_range_is_rejected() {
        let h = harness();
        let (status, body) = send(&h.router, get("/api/products?minPrice=50&maxPrice=10")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_admin_crud_flow() {
        let h = harness();
        let token = admin_token(&h).await;

        for (name, slug, price) in [("Red Shirt", "red-shirt", 30), ("Blue Shirt", "blue-shirt", 10)] {
            let (status, body) = send(
                &h.router,
                json_request("POST", "/api/products", Some(&token), &product_body(name, slug, price)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["data"]["slug"], slug);
        }

        let (status, body) = send(&h.router, get("/api/products?sort=priceLowToHigh")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalProducts"], 2);
        assert_eq!(body["data"][0]["slug"], "blue-shirt");

        let (status, body) = send(&h.router, get("/api/products/by-slug?slug=red-shirt")).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].clone();

        let (status, body) = send(
            &h.router,
            json_request("PUT", "/api/products", Some(&token), &json!({"id": id, "price": 25})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["price"].as_f64(), Some(25.0));

        let (status, body) = send(
            &h.router,
            json_request("PUT", "/api/products", Some(&token), &json!({"id": id, "slug": "other"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Product slug cannot be changed");

        let uri = format!("/api/products?id={id}");
        let (status, body) = send(&h.router, json_request("DELETE", &uri, Some(&token), &Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Product deleted successfully");

        let (status, body) = send(&h.router, get("/api/products/by-slug?slug=red-shirt")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_role() {
        let h = harness();
        let body = product_body("Red Shirt", "red-shirt", 30);

        let (status, resp) = send(&h.router, json_request("POST", "/api/products", None, &body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp["message"], "Unauthorized");

        let (status, resp) =
            send(&h.router, json_request("POST", "/api/products", Some("garbage"), &body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp["message"], "Invalid token");

        let signup = json!({"name": "Bob", "email": "bob@example.com", "password": "hunter2hunter2"});
        send(&h.router, json_request("POST", "/api/auth/signup", None, &signup)).await;
        let login = json!({"email": "bob@example.com", "password": "hunter2hunter2"});
        let (_, resp) = send(&h.router, json_request("POST", "/api/auth/login", None, &login)).await;
        let token = resp["token"].as_str().unwrap().to_owned();

        let (status, resp) =
            send(&h.router, json_request("POST", "/api/products", Some(&token), &body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(resp["message"], "Insufficient permissions");

        let request = Request::builder()
            .uri("/api/protected")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, resp) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "This is a protected route!");
    }

    #[tokio::test]
    async fn test_request_validation_messages() {
        let h = harness();
        let token = admin_token(&h).await;

        let (status, body) = send(&h.router, get("/api/products/by-slug")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Slug is required");

        let (status, body) = send(
            &h.router,
            json_request("DELETE", "/api/products?id=abc", Some(&token), &Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid or missing product ID");

        let (status, body) = send(
            &h.router,
            json_request("PUT", "/api/products", Some(&token), &json!({"price": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid product ID");

        let (status, body) = send(
            &h.router,
            json_request("PUT", "/api/products", Some(&token), &json!({"id": 999, "price": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");

        let mut too_precise = product_body("Red Shirt", "red-shirt", 30);
        too_precise["price"] = json!("10.555");
        let (status, body) = send(
            &h.router,
            json_request("POST", "/api/products", Some(&token), &too_precise),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "price must have at most 10 integer digits and 2 decimals");
    }

    #[tokio::test]
    async fn test_duplicate_signup_and_bad_login() {
        let h = harness();
        let signup = json!({"name": "Ada", "email": "ada@example.com", "password": "correct horse"});
        let (status, body) = send(&h.router, json_request("POST", "/api/auth/signup", None, &signup)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "user");
        assert!(body["data"].get("passwordHash").is_none());

        let (status, body) = send(&h.router, json_request("POST", "/api/auth/signup", None, &signup)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User already exists");

        let login = json!({"email": "ada@example.com", "password": "wrong password"});
        let (status, body) = send(&h.router, json_request("POST", "/api/auth/login", None, &login)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }
}
