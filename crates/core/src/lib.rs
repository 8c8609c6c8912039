//! Atelier Core - Shared catalog types and query building.
//!
//! This crate provides the types shared by every Atelier component:
//! - `storefront` - Catalog HTTP API (listing, detail, accounts, admin CRUD)
//! - `client` - Filter state, query encoding and result accumulation
//! - `cli` - Command-line tools for migrations, seeding and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. A listing request flows through it like this:
//!
//! ```text
//! ListingParams ──► FilterCriteria ──► ProductQuery { Predicate, SortSpec, PageWindow }
//!  (raw query)       (normalized)        (storage-agnostic, rendered to SQL by the store)
//! ```
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, slugs and roles
//! - [`product`] - The `Product` record and its create/update payloads
//! - [`query`] - Filter criteria, predicates and sort specifications
//! - [`pagination`] - Page windows and page metadata
//! - [`api`] - JSON envelopes shared by server and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod pagination;
pub mod product;
pub mod query;
pub mod types;

pub use pagination::{Page, PageInfo, PageWindow};
pub use product::{NewProduct, Product, ProductChanges};
pub use query::{
    CriteriaError, FilterCriteria, ListingParams, PriceRange, ProductQuery, SortKey,
};
pub use types::*;
