//! Catalog service: listing pagination and product administration.

use thiserror::Error;
use tracing::instrument;

use atelier_core::product::ProductError;
use atelier_core::{
    FilterCriteria, NewProduct, Page, PageInfo, Product, ProductChanges, ProductId, ProductQuery,
    Slug,
};

use crate::db::{ProductStore, RepositoryError};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product does not exist.
    #[error("product not found")]
    NotFound,

    /// Another product already uses the slug.
    #[error("A product with this slug already exists")]
    SlugTaken,

    /// The write payload is invalid.
    #[error(transparent)]
    Invalid(#[from] ProductError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::SlugTaken,
            other => Self::Repository(other),
        }
    }
}

/// Catalog operations over a [`ProductStore`].
pub struct CatalogService<'a> {
    products: &'a dyn ProductStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(products: &'a dyn ProductStore) -> Self {
        Self { products }
    }

    /// Fetch one page of the listing.
    ///
    /// The total count and the windowed read are separate store calls. A page
    /// past the end skips the windowed read and returns no rows with the
    /// correct totals.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    #[instrument(skip(self), fields(page = criteria.page, limit = criteria.limit))]
    pub async fn list(&self, criteria: &FilterCriteria) -> Result<Page<Product>, CatalogError> {
        let query = ProductQuery::from_criteria(criteria);

        let total = self.products.count(&query.predicate).await?;
        let items = if query.window.offset() >= total {
            Vec::new()
        } else {
            self.products.fetch_window(&query).await?
        };

        let info = PageInfo::new(query.window, total);
        tracing::debug!(
            total,
            returned = items.len(),
            total_pages = info.total_pages,
            "listing page fetched"
        );
        Ok(Page::new(items, info))
    }

    /// Look a product up by slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this slug.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Product, CatalogError> {
        self.products
            .get_by_slug(slug)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` for an invalid payload and
    /// `CatalogError::SlugTaken` if the slug is in use.
    #[instrument(skip_all, fields(slug = %product.slug))]
    pub async fn create(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let product = product.validated()?;
        let created = self.products.create(&product).await?;
        tracing::info!(product_id = %created.id, "product created");
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist and
    /// `CatalogError::Invalid` for a slug change or invalid field.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, CatalogError> {
        let current = self.products.get(id).await?.ok_or(CatalogError::NotFound)?;
        let next = changes.apply_to(&current)?;
        let updated = self.products.update(&next).await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(updated)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        self.products.delete(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::query::ListingParams;
    use atelier_core::{Price, ProductId};
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::db::MemoryProductStore;

    fn product(id: i32, name: &str, price: u32) -> Product {
        let created_at: DateTime<Utc> =
            DateTime::from_timestamp(1_700_000_000 + i64::from(id) * 60, 0).unwrap();
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            slug: Slug::from_name(&format!("{name} {id}")).unwrap(),
            price: Price::from_units(price),
            brand: "Atelier".to_owned(),
            image: format!("/images/{id}.jpg"),
            category: "Tops".to_owned(),
            dress_style: "Casual".to_owned(),
            colors: vec!["Black".to_owned()],
            sizes: vec!["M".to_owned()],
            description: format!("{name} description"),
            popularity: 0,
            created_at,
            updated_at: created_at,
        }
    }

    fn criteria(params: ListingParams) -> FilterCriteria {
        FilterCriteria::from_params(&params).unwrap()
    }

    #[tokio::test]
    async fn test_price_sort_pages() {
        let store = MemoryProductStore::new();
        store.insert_all([product(1, "A", 30), product(2, "B", 10), product(3, "C", 20)]);
        let catalog = CatalogService::new(&store);

        let params = |page: &str| ListingParams {
            page: Some(page.to_owned()),
            limit: Some("2".to_owned()),
            sort: Some("priceLowToHigh".to_owned()),
            ..ListingParams::default()
        };

        let first = catalog.list(&criteria(params("1"))).await.unwrap();
        let prices: Vec<_> = first.items.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![Price::from_units(10), Price::from_units(20)]);
        assert_eq!(first.info.total_pages, 2);
        assert!(first.info.has_more());

        let second = catalog.list(&criteria(params("2"))).await.unwrap();
        let prices: Vec<_> = second.items.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![Price::from_units(30)]);
        assert!(!second.info.has_more());
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty_with_totals() {
        let store = MemoryProductStore::new();
        store.insert_all([product(1, "A", 30)]);
        let catalog = CatalogService::new(&store);

        let page = catalog
            .list(&criteria(ListingParams {
                page: Some("9".to_owned()),
                ..ListingParams::default()
            }))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.info.total_products, 1);
        assert_eq!(page.info.total_pages, 1);
        assert_eq!(page.info.current_page, 9);
    }

    #[tokio::test]
    async fn test_exact_price_match() {
        let store = MemoryProductStore::new();
        store.insert_all([product(1, "A", 30), product(2, "B", 20), product(3, "C", 20)]);
        let catalog = CatalogService::new(&store);

        let page = catalog
            .list(&criteria(ListingParams {
                min_price: Some("20".to_owned()),
                max_price: Some("20".to_owned()),
                ..ListingParams::default()
            }))
            .await
            .unwrap();
        assert_eq!(page.info.total_products, 2);
        assert!(page.items.iter().all(|p| p.price == Price::from_units(20)));
    }

    #[tokio::test]
    async fn test_update_rejects_slug_change_and_missing() {
        let store = MemoryProductStore::new();
        store.insert_all([product(1, "A", 30)]);
        let catalog = CatalogService::new(&store);

        let change_slug = ProductChanges {
            slug: Some("other".to_owned()),
            ..ProductChanges::default()
        };
        assert!(matches!(
            catalog.update(ProductId::new(1), &change_slug).await,
            Err(CatalogError::Invalid(ProductError::SlugChange))
        ));
        assert!(matches!(
            catalog
                .update(ProductId::new(2), &ProductChanges::default())
                .await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            catalog.delete(ProductId::new(2)).await,
            Err(CatalogError::NotFound)
        ));
    }
}
