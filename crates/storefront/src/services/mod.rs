//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Listing pagination and product administration
//! - `auth` - Password signup and login
//! - `tokens` - Bearer token issuing and verification

pub mod auth;
pub mod catalog;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use tokens::{Claims, Principal, TokenError, TokenService};
