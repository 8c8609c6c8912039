//! Listing request parameters and their normalized form.
//!
//! [`ListingParams`] is the raw request descriptor exactly as it travels in a
//! URL query string. [`FilterCriteria::from_params`] turns it into a validated
//! value, failing closed on malformed numbers by substituting defaults.

use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pagination::PageWindow;
use crate::types::Price;

/// Default page when `page` is absent or malformed.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when `limit` is absent or malformed.
pub const DEFAULT_LIMIT: u32 = 12;
/// Largest page size a single request may ask for.
pub const MAX_LIMIT: u32 = 100;
/// Price used to mean "no maximum".
pub const PRICE_SENTINEL: u32 = 1_000_000;

/// Errors for well-formed but contradictory criteria.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    #[error("minPrice ({min}) cannot be greater than maxPrice ({max})")]
    InvertedPriceRange { min: Price, max: Price },
}

/// Raw listing query parameters.
///
/// Every field is optional text so that decoding a query string never fails;
/// interpretation happens in [`FilterCriteria::from_params`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub categories: Option<String>,
    pub colors: Option<String>,
    pub sizes: Option<String>,
    pub dress_styles: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl ListingParams {
    /// The present parameters as `(wire name, value)` pairs in a fixed order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("page", &self.page),
            ("limit", &self.limit),
            ("search", &self.search),
            ("sort", &self.sort),
            ("minPrice", &self.min_price),
            ("maxPrice", &self.max_price),
            ("categories", &self.categories),
            ("colors", &self.colors),
            ("sizes", &self.sizes),
            ("dressStyles", &self.dress_styles),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// Result ordering requested by the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Creation time, newest first.
    #[default]
    Newest,
    /// Popularity, most popular first.
    Recommended,
    /// Price, cheapest first.
    PriceAsc,
    /// Price, most expensive first.
    PriceDesc,
}

impl SortKey {
    /// Resolve a wire value. Unknown or missing values fall back to `Newest`.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim) else {
            return Self::Newest;
        };
        if value.eq_ignore_ascii_case("recommended") {
            Self::Recommended
        } else if value.eq_ignore_ascii_case("priceLowToHigh") {
            Self::PriceAsc
        } else if value.eq_ignore_ascii_case("priceHighToLow") {
            Self::PriceDesc
        } else {
            Self::Newest
        }
    }

    /// The wire value for this key.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Newest => "new",
            Self::Recommended => "recommended",
            Self::PriceAsc => "priceLowToHigh",
            Self::PriceDesc => "priceHighToLow",
        }
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceRange {
    min: Price,
    max: Price,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Price::ZERO,
            max: Self::sentinel(),
        }
    }
}

impl PriceRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::InvertedPriceRange`] if `min > max`.
    pub fn new(min: Price, max: Price) -> Result<Self, CriteriaError> {
        if min > max {
            return Err(CriteriaError::InvertedPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range with no upper bound.
    #[must_use]
    pub fn at_least(min: Price) -> Self {
        Self {
            min,
            max: min.max(Self::sentinel()),
        }
    }

    /// The "no maximum" price.
    #[must_use]
    pub fn sentinel() -> Price {
        Price::from_units(PRICE_SENTINEL)
    }

    #[must_use]
    pub const fn min(&self) -> Price {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Price {
        self.max
    }

    /// Lower bound to enforce, if any (`min > 0`).
    #[must_use]
    pub fn lower_bound(&self) -> Option<Price> {
        (self.min > Price::ZERO).then_some(self.min)
    }

    /// Upper bound to enforce, if any (`max` below the sentinel).
    #[must_use]
    pub fn upper_bound(&self) -> Option<Price> {
        (self.max < Self::sentinel()).then_some(self.max)
    }
}

/// Normalized listing criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort: SortKey,
    pub price: PriceRange,
    pub categories: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub dress_styles: BTreeSet<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            sort: SortKey::Newest,
            price: PriceRange::default(),
            categories: BTreeSet::new(),
            colors: BTreeSet::new(),
            sizes: BTreeSet::new(),
            dress_styles: BTreeSet::new(),
        }
    }
}

impl FilterCriteria {
    /// Interpret raw parameters.
    ///
    /// Malformed numbers never fail the request: `page` falls back to 1,
    /// `limit` to 12 (capped at [`MAX_LIMIT`]), `minPrice` to 0 and
    /// `maxPrice` to the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::InvertedPriceRange`] when both prices parse
    /// but `minPrice > maxPrice`. A lone `minPrice` above the sentinel is not
    /// an inversion; it simply matches nothing.
    pub fn from_params(params: &ListingParams) -> Result<Self, CriteriaError> {
        let min = parse_price(params.min_price.as_deref()).unwrap_or(Price::ZERO);
        // Only a supplied, well-formed max can invert the range.
        let price = match parse_price(params.max_price.as_deref()) {
            Some(max) => PriceRange::new(min, max)?,
            None => PriceRange::at_least(min),
        };

        Ok(Self {
            page: parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(params.limit.as_deref())
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
            search: params
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            sort: SortKey::from_param(params.sort.as_deref()),
            price,
            categories: decode_set(params.categories.as_deref()),
            colors: decode_set(params.colors.as_deref()),
            sizes: decode_set(params.sizes.as_deref()),
            dress_styles: decode_set(params.dress_styles.as_deref()),
        })
    }

    /// The page window these criteria select.
    #[must_use]
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.limit)
    }
}

/// Parse a positive integer; anything else (including 0 and negatives) is
/// treated as absent. Values beyond `u32::MAX` saturate.
fn parse_positive(raw: Option<&str>) -> Option<u32> {
    let value = raw?.trim().parse::<i64>().ok()?;
    if value <= 0 {
        return None;
    }
    Some(u32::try_from(value).unwrap_or(u32::MAX))
}

fn parse_price(raw: Option<&str>) -> Option<Price> {
    let amount = Decimal::from_str(raw?.trim()).ok()?;
    Price::new(amount).ok()
}

/// Decode a comma-separated set. Blank entries are dropped, so an empty
/// string means "no constraint".
fn decode_set(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}
