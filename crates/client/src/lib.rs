//! Atelier Client - Catalog browsing from the shopper's side.
//!
//! # Architecture
//!
//! ```text
//! FilterAction ──► FilterState ──► encode ──► ListingParams ──► CatalogClient
//!                                                                   │
//!            ResultAccumulator ◄── ListResponse ◄───────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`filter_state`] - Filter selections and their pure transitions
//! - [`encoder`] - Filter state to query parameters
//! - [`accumulator`] - Reset/load-more merging with stale response guards
//! - [`session`] - The pieces above wired to a fetcher
//! - [`http`] - `reqwest` client for the catalog API
//! - [`wishlist`] - Wishlisted ids over a key-value store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod accumulator;
pub mod encoder;
pub mod filter_state;
pub mod http;
pub mod session;
pub mod wishlist;

pub use accumulator::{FetchTicket, MergeOutcome, ResultAccumulator};
pub use encoder::{encode, to_query_string};
pub use filter_state::{Facet, FilterAction, FilterError, FilterState};
pub use http::{CatalogClient, ClientError};
pub use session::{ListingFetcher, ListingSession, PendingFetch};
pub use wishlist::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, Wishlist};
