//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (when `STOREFRONT_CORS_ORIGIN` is set)
//! 3. `TraceLayer` (request span, status and latency)
//! 4. Request ID (assign `x-request-id`, record it on the span)
//!
//! Authentication is per-route via the [`RequireAuth`] and [`RequireAdmin`]
//! extractors.

pub mod auth;
pub mod request_id;

pub use auth::{AuthRejection, RequireAdmin, RequireAuth};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
