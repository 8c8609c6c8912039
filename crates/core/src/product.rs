//! The catalog `Product` record and its write payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, Slug};

/// Errors raised while validating product write payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    /// A required text field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// A color or size entry is blank or contains a comma.
    #[error("{0} entries must be non-empty and cannot contain commas")]
    InvalidListEntry(&'static str),
    /// An update tried to assign a different slug.
    #[error("Product slug cannot be changed")]
    SlugChange,
    /// The price has more than two decimals or too many integer digits.
    #[error("price must have at most 10 integer digits and 2 decimals")]
    PriceOutOfRange,
}

/// Decimal places a stored price may carry.
pub const PRICE_SCALE: u32 = 2;

/// Integer digits a stored price may carry.
pub const PRICE_INTEGER_DIGITS: u32 = 10;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub price: Price,
    pub brand: String,
    /// Image reference (URL or asset path); delivery happens elsewhere.
    pub image: String,
    pub category: String,
    pub dress_style: String,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub popularity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub slug: Slug,
    pub price: Price,
    pub brand: String,
    pub image: String,
    pub category: String,
    pub dress_style: String,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub popularity: i32,
}

impl NewProduct {
    /// Trim every text field and check that required ones are present.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError`] naming the first offending field.
    pub fn validated(mut self) -> Result<Self, ProductError> {
        self.name = required("name", &self.name)?;
        self.price = storable(self.price)?;
        self.brand = required("brand", &self.brand)?;
        self.image = required("image", &self.image)?;
        self.category = required("category", &self.category)?;
        self.dress_style = required("dressStyle", &self.dress_style)?;
        self.description = required("description", &self.description)?;
        self.colors = list("colors", &self.colors)?;
        self.sizes = list("sizes", &self.sizes)?;
        Ok(self)
    }
}

/// Partial update for an existing product.
///
/// Absent fields are left unchanged. `slug` is accepted only so that an
/// attempt to change it can be rejected explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub price: Option<Price>,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub dress_style: Option<String>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub description: Option<String>,
    pub popularity: Option<i32>,
}

impl ProductChanges {
    /// Apply the changes to `product`, leaving it untouched on error.
    ///
    /// The caller is responsible for bumping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::SlugChange`] if a different slug is supplied, or
    /// a validation error for blank required fields.
    pub fn apply_to(&self, product: &Product) -> Result<Product, ProductError> {
        if let Some(slug) = &self.slug
            && slug != product.slug.as_str()
        {
            return Err(ProductError::SlugChange);
        }

        let mut next = product.clone();
        if let Some(name) = &self.name {
            next.name = required("name", name)?;
        }
        if let Some(price) = self.price {
            next.price = storable(price)?;
        }
        if let Some(brand) = &self.brand {
            next.brand = required("brand", brand)?;
        }
        if let Some(image) = &self.image {
            next.image = required("image", image)?;
        }
        if let Some(category) = &self.category {
            next.category = required("category", category)?;
        }
        if let Some(dress_style) = &self.dress_style {
            next.dress_style = required("dressStyle", dress_style)?;
        }
        if let Some(colors) = &self.colors {
            next.colors = list("colors", colors)?;
        }
        if let Some(sizes) = &self.sizes {
            next.sizes = list("sizes", sizes)?;
        }
        if let Some(description) = &self.description {
            next.description = required("description", description)?;
        }
        if let Some(popularity) = self.popularity {
            next.popularity = popularity;
        }
        Ok(next)
    }
}

/// Prices must fit `NUMERIC(12, 2)` exactly.
fn storable(price: Price) -> Result<Price, ProductError> {
    let amount = price.amount().normalize();
    let limit = Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS));
    if amount.scale() > PRICE_SCALE || amount >= limit {
        return Err(ProductError::PriceOutOfRange);
    }
    Ok(price)
}

fn required(field: &'static str, value: &str) -> Result<String, ProductError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProductError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

fn list(field: &'static str, values: &[String]) -> Result<Vec<String>, ProductError> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains(',') {
            return Err(ProductError::InvalidListEntry(field));
        }
        if !out.iter().any(|existing| existing == trimmed) {
            out.push(trimmed.to_owned());
        }
    }
    Ok(out)
}
