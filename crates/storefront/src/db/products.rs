//! `PostgreSQL` product store.
//!
//! Listing queries are assembled with [`QueryBuilder`] so that every filter
//! value is a bound parameter. Only static column names and the `ORDER BY`
//! rendering from [`SortSpec`](atelier_core::query::SortSpec) are spliced in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use atelier_core::query::{Clause, Predicate, contains_pattern};
use atelier_core::{NewProduct, Price, Product, ProductId, ProductQuery, Slug};

use super::{ProductStore, RepositoryError};

const PRODUCT_COLUMNS: &str = "id, name, slug, price, brand, image, category, dress_style, \
     colors, sizes, description, popularity, created_at, updated_at";

const SLUG_CONFLICT: &str = "A product with this slug already exists";

/// Raw `catalog.product` row.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    price: Decimal,
    brand: String,
    image: String,
    category: String,
    dress_style: String,
    colors: Vec<String>,
    sizes: Vec<String>,
    description: String,
    popularity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug {:?} in database: {e}", row.slug))
        })?;
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug,
            price,
            brand: row.brand,
            image: row.image,
            category: row.category,
            dress_style: row.dress_style,
            colors: row.colors,
            sizes: row.sizes,
            description: row.description,
            popularity: row.popularity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Product store backed by `catalog.product`.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append `WHERE ...` for the predicate. An empty predicate appends nothing.
fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    for (index, clause) in predicate.clauses().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        match clause {
            Clause::PriceAtLeast(bound) => {
                builder.push("price >= ").push_bind(bound.amount());
            }
            Clause::PriceAtMost(bound) => {
                builder.push("price <= ").push_bind(bound.amount());
            }
            Clause::Search(term) => {
                let pattern = contains_pattern(term);
                builder
                    .push("(name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR description ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            Clause::AnyOf { field, values } => {
                builder.push(field.column());
                if field.is_list() {
                    builder.push(" && ").push_bind(values.clone()).push("::text[]");
                } else {
                    builder.push(" = ANY(").push_bind(values.clone()).push(")");
                }
            }
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn count(&self, predicate: &Predicate) -> Result<u64, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM catalog.product");
        push_predicate(&mut builder, predicate);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {count}")))
    }

    async fn fetch_window(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM catalog.product"));
        push_predicate(&mut builder, &query.predicate);
        builder
            .push(" ORDER BY ")
            .push(query.sort.to_sql())
            .push(" LIMIT ")
            .push_bind(i64::from(query.window.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.window.offset()).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO catalog.product
                (name, slug, price, brand, image, category, dress_style,
                 colors, sizes, description, popularity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(product.slug.as_str())
        .bind(product.price)
        .bind(&product.brand)
        .bind(&product.image)
        .bind(&product.category)
        .bind(&product.dress_style)
        .bind(&product.colors)
        .bind(&product.sizes)
        .bind(&product.description)
        .bind(product.popularity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, SLUG_CONFLICT))?;

        Product::try_from(row)
    }

    async fn update(&self, product: &Product) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE catalog.product
            SET name = $2, price = $3, brand = $4, image = $5, category = $6,
                dress_style = $7, colors = $8, sizes = $9, description = $10,
                popularity = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.brand)
        .bind(&product.image)
        .bind(&product.category)
        .bind(&product.dress_style)
        .bind(&product.colors)
        .bind(&product.sizes)
        .bind(&product.description)
        .bind(product.popularity)
        .fetch_optional(&self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), Product::try_from)
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
