//! HTTP client for the catalog API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use atelier_core::api::{
    Credentials, DataResponse, ListResponse, MessageResponse, SignupRequest, TokenResponse,
    UserSummary,
};
use atelier_core::{ListingParams, NewProduct, Product, ProductChanges, ProductId};

/// Errors from talking to the catalog API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a failure envelope or a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The base URL cannot be joined with an API path.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// The HTTP status of an API error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the catalog HTTP API.
///
/// Cheap to clone. A bearer token, when set, is sent with every request.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    id: ProductId,
    #[serde(flatten)]
    changes: &'a ProductChanges,
}

impl CatalogClient {
    /// Create a client for the API served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Url`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self::with_http_client(reqwest::Client::new(), Url::parse(base_url)?))
    }

    /// Create a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url,
                token: None,
            }),
        }
    }

    /// A copy of this client that authenticates with `token`.
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(CatalogClientInner {
                client: self.inner.client.clone(),
                base_url: self.inner.base_url.clone(),
                token: Some(token.into()),
            }),
        }
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch one listing page.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport, API or decode failure.
    #[instrument(skip(self))]
    pub async fn list_products(&self, params: &ListingParams) -> Result<ListResponse, ClientError> {
        let request = self.request(Method::GET, "/api/products", &params.pairs())?;
        self.send(request).await
    }

    /// Fetch a product by slug.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 for an unknown slug.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, ClientError> {
        let request = self.request(Method::GET, "/api/products/by-slug", &[("slug", slug)])?;
        let body: DataResponse<Product> = self.send(request).await?;
        Ok(body.data)
    }

    /// Create a product. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport, API or decode failure.
    #[instrument(skip(self, product), fields(slug = %product.slug))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ClientError> {
        let request = self.request(Method::POST, "/api/products", &[])?.json(product);
        let body: DataResponse<Product> = self.send(request).await?;
        Ok(body.data)
    }

    /// Update a product. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport, API or decode failure.
    #[instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, ClientError> {
        let request = self
            .request(Method::PUT, "/api/products", &[])?
            .json(&UpdateBody { id, changes });
        let body: DataResponse<Product> = self.send(request).await?;
        Ok(body.data)
    }

    /// Delete a product. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport, API or decode failure.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<String, ClientError> {
        let id = id.to_string();
        let request = self.request(Method::DELETE, "/api/products", &[("id", id.as_str())])?;
        let body: MessageResponse = self.send(request).await?;
        Ok(body.message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────────

    /// Register an account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 400 if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSummary, ClientError> {
        let request = self
            .request(Method::POST, "/api/auth/signup", &[])?
            .json(&SignupRequest {
                name: name.to_owned(),
                email: email.to_owned(),
                password: password.to_owned(),
            });
        let body: DataResponse<UserSummary> = self.send(request).await?;
        Ok(body.data)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 401 for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let request = self
            .request(Method::POST, "/api/auth/login", &[])?
            .json(&Credentials {
                email: email.to_owned(),
                password: password.to_owned(),
            });
        let body: TokenResponse = self.send(request).await?;
        Ok(body.token)
    }

    /// Call the token-check route.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 401 without a valid token.
    pub async fn protected(&self) -> Result<String, ClientError> {
        let request = self.request(Method::GET, "/api/protected", &[])?;
        let body: MessageResponse = self.send(request).await?;
        Ok(body.message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────────

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, ClientError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let mut request = self.inner.client.request(method, url);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let text = response.text().await?;
        debug!(status = %status, bytes = text.len(), "catalog API response");

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            ClientError::Decode(e)
        })
    }
}

/// Build an API error from a failure body, falling back to the raw text.
fn api_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<MessageResponse>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |envelope| envelope.message,
    );
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_reads_envelope() {
        let err = api_error(
            StatusCode::NOT_FOUND,
            r#"{"success":false,"message":"Product not found"}"#,
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API error (404): Product not found");
    }

    #[test]
    fn test_api_error_falls_back_to_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert!(matches!(
            err,
            ClientError::Api { status: 502, ref message } if message == "upstream unavailable"
        ));
    }

    #[test]
    fn test_rejects_relative_base_url() {
        assert!(matches!(
            CatalogClient::new("/api"),
            Err(ClientError::Url(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = CatalogClient::new("http://127.0.0.1:3000")
            .unwrap()
            .with_token("secret-token");
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_update_body_flattens_changes() {
        let changes = ProductChanges {
            popularity: Some(3),
            ..ProductChanges::default()
        };
        let body = serde_json::to_value(UpdateBody {
            id: ProductId::new(4),
            changes: &changes,
        })
        .unwrap();
        assert_eq!(body["id"], 4);
        assert_eq!(body["popularity"], 3);
    }
}
