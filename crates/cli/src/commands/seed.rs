//! Seed the catalog with products from a YAML file.
//!
//! The file holds a `products` list whose entries use the same field names
//! as the JSON API (`name`, `slug`, `price`, `dressStyle`, ...). Every entry
//! is validated before the database is touched. Products whose slug already
//! exists are skipped.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use atelier_core::NewProduct;
use atelier_storefront::db::{self, PgProductStore, ProductStore, RepositoryError};

use super::database_url;

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<NewProduct>,
}

/// Counts from one seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub cleared: u64,
    pub inserted: usize,
    pub skipped: usize,
}

/// Parse and validate a seed file.
///
/// Returns every validation problem, not just the first.
pub fn parse(content: &str) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let mut products = Vec::with_capacity(file.products.len());
    let mut errors = Vec::new();
    for product in file.products {
        let slug = product.slug.to_string();
        match product.validated() {
            Ok(product) => products.push(product),
            Err(e) => errors.push(format!("{slug}: {e}")),
        }
    }

    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    Ok(products)
}

/// Insert `products`, optionally clearing the catalog first.
pub async fn seed_store(
    store: &dyn ProductStore,
    products: &[NewProduct],
    clear: bool,
) -> Result<SeedReport, RepositoryError> {
    let mut report = SeedReport::default();

    if clear {
        report.cleared = store.clear().await?;
        info!(removed = report.cleared, "Cleared existing products");
    }

    for product in products {
        match store.create(product).await {
            Ok(created) => {
                report.inserted += 1;
                info!(id = %created.id, slug = %created.slug, "Inserted product");
            }
            Err(RepositoryError::Conflict(_)) => {
                report.skipped += 1;
                warn!(slug = %product.slug, "Skipping existing product");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Seed products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
/// * `clear_existing` - If true, remove every product first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or validated, or a database operation fails.
pub async fn products(
    file_path: &str,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse(&content)?;
    info!(products = products.len(), "Seed file validated");

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let store = PgProductStore::new(pool);
    let report = seed_store(&store, &products, clear_existing).await?;

    info!("Seeding complete!");
    info!("  Products removed: {}", report.cleared);
    info!("  Products inserted: {}", report.inserted);
    info!("  Products skipped (already exist): {}", report.skipped);

    Ok(())
}
