//! Product route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use atelier_core::api::{DataResponse, ListResponse, MessageResponse, PRODUCT_DELETED};
use atelier_core::{FilterCriteria, ListingParams, NewProduct, Product, ProductChanges, ProductId, Slug};

use super::{ApiJson, ApiQuery};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::CatalogService;
use crate::state::AppState;

/// `?slug=` for the detail lookup.
#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    pub slug: Option<String>,
}

/// `?id=` for deletion.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Body of `PUT /api/products`: the target id plus the fields to change.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    /// Accepted as a number or a numeric string.
    pub id: Option<Value>,
    #[serde(flatten)]
    pub changes: ProductChanges,
}

/// Parse an id given as a JSON number or string.
fn product_id_from_json(value: Option<&Value>) -> Option<ProductId> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .filter(|n| *n > 0)
            .map(ProductId::new),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// List products with filtering, sorting and pagination.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListingParams>,
) -> Result<Json<ListResponse>> {
    let criteria = FilterCriteria::from_params(&params)?;
    let page = CatalogService::new(state.products()).list(&criteria).await?;
    Ok(Json(page.into()))
}

/// Fetch one product by slug.
#[instrument(skip(state))]
pub async fn by_slug(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SlugQuery>,
) -> Result<Json<DataResponse<Product>>> {
    let raw = query
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Slug is required".to_string()))?;

    // A string that is not a well-formed slug cannot name a product.
    let slug = Slug::parse(raw).map_err(|_| AppError::NotFound("Product not found".to_string()))?;

    let product = CatalogService::new(state.products())
        .get_by_slug(&slug)
        .await?;
    Ok(Json(DataResponse::ok(product)))
}

/// Create a product (admin).
#[instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(product): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<DataResponse<Product>>)> {
    let created = CatalogService::new(state.products()).create(product).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::ok(created))))
}

/// Update a product (admin).
#[instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(request): ApiJson<UpdateProductRequest>,
) -> Result<Json<DataResponse<Product>>> {
    let id = product_id_from_json(request.id.as_ref())
        .ok_or_else(|| AppError::BadRequest("Invalid product ID".to_string()))?;

    let updated = CatalogService::new(state.products())
        .update(id, &request.changes)
        .await?;
    Ok(Json(DataResponse::ok(updated)))
}

/// Delete a product (admin).
#[instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> Result<Json<MessageResponse>> {
    let id = query
        .id
        .as_deref()
        .and_then(|raw| raw.parse::<ProductId>().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid or missing product ID".to_string()))?;

    CatalogService::new(state.products()).delete(id).await?;
    Ok(Json(MessageResponse::ok(PRODUCT_DELETED)))
}
