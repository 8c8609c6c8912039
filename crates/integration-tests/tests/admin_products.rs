//! Integration tests for accounts, bearer tokens and admin product CRUD.
//!
//! Admin clients are produced by signing up, promoting the account directly
//! in the in-memory user store, then logging in so the token carries the
//! admin role.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use atelier_client::ClientError;
use atelier_core::{Price, ProductChanges, ProductId, Role};
use atelier_integration_tests::{TestServer, new_product};
use atelier_storefront::db::ProductStore;

/// A fresh address so repeated runs never collide.
fn unique_email() -> String {
    format!("shopper-{}@atelier.test", Uuid::new_v4().simple())
}

fn api_error(err: ClientError) -> (u16, String) {
    match err {
        ClientError::Api { status, message } => (status, message),
        other => panic!("expected an API error, got {other}"),
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_signup_login_and_protected_route() {
    let server = TestServer::spawn().await;
    let client = server.client();
    let email = unique_email();

    let user = client.signup("Ada", &email, "password-123").await.unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(user.role, Role::User);

    let token = client.login(&email, "password-123").await.unwrap();
    let message = client.with_token(token).protected().await.unwrap();
    assert_eq!(message, "This is a protected route!");
}

#[tokio::test]
async fn test_account_errors() {
    let server = TestServer::spawn().await;
    let client = server.client();
    let email = unique_email();
    client.signup("Ada", &email, "password-123").await.unwrap();

    let (status, message) = api_error(
        client
            .signup("Ada Again", &email, "password-456")
            .await
            .unwrap_err(),
    );
    assert_eq!(status, 400);
    assert_eq!(message, "User already exists");

    let (status, message) = api_error(client.login(&email, "wrong-password").await.unwrap_err());
    assert_eq!(status, 401);
    assert_eq!(message, "Invalid credentials");

    let (status, message) = api_error(client.protected().await.unwrap_err());
    assert_eq!(status, 401);
    assert_eq!(message, "Unauthorized");

    let (status, message) = api_error(
        client
            .with_token("not.a.token")
            .protected()
            .await
            .unwrap_err(),
    );
    assert_eq!(status, 401);
    assert_eq!(message, "Invalid token");
}

// =============================================================================
// Admin CRUD
// =============================================================================

#[tokio::test]
async fn test_admin_crud_flow() {
    let server = TestServer::spawn().await;
    let admin = server.admin_client().await;

    let created = admin
        .create_product(&new_product("Wool Coat", 240))
        .await
        .unwrap();
    assert_eq!(created.slug.as_str(), "wool-coat");

    let changes = ProductChanges {
        price: Some(Price::from_units(199)),
        popularity: Some(7),
        ..ProductChanges::default()
    };
    let updated = admin.update_product(created.id, &changes).await.unwrap();
    assert_eq!(updated.price, Price::from_units(199));
    assert_eq!(updated.popularity, 7);
    assert_eq!(updated.name, "Wool Coat");
    assert_eq!(updated.created_at, created.created_at);

    // Visible to shoppers.
    let fetched = server.client().product_by_slug("wool-coat").await.unwrap();
    assert_eq!(fetched.price, Price::from_units(199));

    let message = admin.delete_product(created.id).await.unwrap();
    assert_eq!(message, "Product deleted successfully");

    let (status, message) = api_error(admin.delete_product(created.id).await.unwrap_err());
    assert_eq!(status, 404);
    assert_eq!(message, "Product not found");
}

#[tokio::test]
async fn test_duplicate_slug_is_rejected() {
    let server = TestServer::spawn().await;
    let admin = server.admin_client().await;
    admin
        .create_product(&new_product("Silk Scarf", 45))
        .await
        .unwrap();

    let (status, message) = api_error(
        admin
            .create_product(&new_product("Silk Scarf", 50))
            .await
            .unwrap_err(),
    );
    assert_eq!(status, 400);
    assert_eq!(message, "A product with this slug already exists");
}

#[tokio::test]
async fn test_update_rejects_slug_change_and_unknown_id() {
    let server = TestServer::spawn().await;
    let admin = server.admin_client().await;
    let created = admin
        .create_product(&new_product("Denim Jacket", 120))
        .await
        .unwrap();

    let changes = ProductChanges {
        slug: Some("other-jacket".to_owned()),
        ..ProductChanges::default()
    };
    let (status, message) =
        api_error(admin.update_product(created.id, &changes).await.unwrap_err());
    assert_eq!(status, 400);
    assert_eq!(message, "Product slug cannot be changed");

    let (status, message) = api_error(
        admin
            .update_product(ProductId::new(9_999), &ProductChanges::default())
            .await
            .unwrap_err(),
    );
    assert_eq!(status, 404);
    assert_eq!(message, "Product not found");
}

#[tokio::test]
async fn test_writes_require_admin_role() {
    let server = TestServer::spawn().await;
    let anonymous = server.client();

    let (status, message) = api_error(
        anonymous
            .create_product(&new_product("Hat", 20))
            .await
            .unwrap_err(),
    );
    assert_eq!(status, 401);
    assert_eq!(message, "Unauthorized");

    let email = unique_email();
    anonymous.signup("Bob", &email, "password-123").await.unwrap();
    let token = anonymous.login(&email, "password-123").await.unwrap();
    let shopper = anonymous.with_token(token);

    let (status, message) = api_error(
        shopper
            .create_product(&new_product("Hat", 20))
            .await
            .unwrap_err(),
    );
    assert_eq!(status, 403);
    assert_eq!(message, "Insufficient permissions");

    // Nothing was written.
    assert_eq!(server.products.clear().await.unwrap(), 0);
}

// =============================================================================
// Raw HTTP
// =============================================================================

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let server = TestServer::spawn().await;
    let token = server.admin_token().await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/products", server.base_url());

    let response = http
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({ "id": "abc", "name": "Renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid product ID");

    let response = http
        .delete(format!("{url}?id=abc"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid or missing product ID");
}

