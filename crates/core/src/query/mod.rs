//! Catalog listing queries.
//!
//! A listing request is decoded into [`ListingParams`], normalized into
//! [`FilterCriteria`], and compiled into a storage-agnostic [`ProductQuery`].
//! Stores translate the query into their own representation: the Postgres
//! store renders SQL, the in-memory store evaluates it directly.

mod criteria;
mod predicate;
mod sort;

pub use criteria::{
    CriteriaError, DEFAULT_LIMIT, DEFAULT_PAGE, FilterCriteria, ListingParams, MAX_LIMIT,
    PRICE_SENTINEL, PriceRange, SortKey,
};
pub use predicate::{Clause, Predicate, SetField, contains_pattern};
pub use sort::{Direction, SortField, SortSpec};

use crate::pagination::PageWindow;
use crate::product::Product;

/// A compiled listing query: what to match, how to order, which slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub predicate: Predicate,
    pub sort: SortSpec,
    pub window: PageWindow,
}

impl ProductQuery {
    /// Compile normalized criteria.
    #[must_use]
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            predicate: Predicate::from_criteria(criteria),
            sort: SortSpec::for_key(criteria.sort),
            window: criteria.window(),
        }
    }

    /// Evaluate the query over an in-memory collection.
    ///
    /// Returns the requested slice and the total number of matches.
    #[must_use]
    pub fn apply<'a, I>(&self, products: I) -> (Vec<Product>, u64)
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut matched: Vec<&Product> = products
            .into_iter()
            .filter(|p| self.predicate.matches(p))
            .collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));

        let total = matched.len() as u64;
        let offset = usize::try_from(self.window.offset()).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(self.window.limit() as usize)
            .cloned()
            .collect();
        (items, total)
    }
}
