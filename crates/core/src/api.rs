//! JSON envelopes exchanged between the storefront and its clients.
//!
//! Every response body carries a `success` flag. Failures carry a
//! human-readable `message`.

use serde::{Deserialize, Serialize};

use crate::pagination::Page;
use crate::product::Product;
use crate::types::{Email, Role, UserId};

/// Body of `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Product>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_products: u64,
}

impl From<Page<Product>> for ListResponse {
    fn from(page: Page<Product>) -> Self {
        Self {
            success: true,
            data: page.items,
            current_page: page.info.current_page,
            total_pages: page.info.total_pages,
            total_products: page.info.total_products,
        }
    }
}

/// A successful response wrapping a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A response carrying only a message, used for failures and for
/// acknowledgements such as deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Body of `DELETE /api/products` on success.
pub const PRODUCT_DELETED: &str = "Product deleted successfully";
