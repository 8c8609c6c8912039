//! Shopper-facing filter selections and their transitions.
//!
//! [`FilterState`] is a plain value. Every change goes through
//! [`FilterState::apply`], which returns the next state without touching the
//! current one, so callers can compare old and new to decide whether a
//! refetch is needed.

use std::collections::BTreeSet;

use atelier_core::{CriteriaError, Price, PriceRange, SortKey};

/// Errors from a rejected transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Set values travel comma-joined, so a comma cannot be represented.
    #[error("filter value {0:?} cannot contain a comma")]
    CommaInValue(String),

    /// A blank value would decode as "no constraint".
    #[error("filter value cannot be blank")]
    BlankValue,

    #[error(transparent)]
    Criteria(#[from] CriteriaError),
}

/// The multi-valued filter dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Category,
    Color,
    Size,
    DressStyle,
}

/// A single shopper interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetSort(SortKey),
    SetPriceRange { min: Price, max: Price },
    SetMinPrice(Price),
    SetMaxPrice(Price),
    ToggleCategory(String),
    ToggleColor(String),
    ToggleSize(String),
    ToggleDressStyle(String),
    /// Blank text clears the search.
    SetSearch(String),
    /// Back to the initial snapshot.
    ClearAll,
}

/// Current sort tab, price range, search text and selected facet values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub sort: SortKey,
    pub price: PriceRange,
    pub search: String,
    pub categories: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub dress_styles: BTreeSet<String>,
}

impl FilterState {
    /// Compute the state after `action`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the action would produce an inverted price
    /// range or a facet value that cannot be encoded.
    pub fn apply(&self, action: FilterAction) -> Result<Self, FilterError> {
        let mut next = self.clone();
        match action {
            FilterAction::SetSort(sort) => next.sort = sort,
            FilterAction::SetPriceRange { min, max } => next.price = PriceRange::new(min, max)?,
            FilterAction::SetMinPrice(min) => {
                next.price = match self.price.upper_bound() {
                    Some(max) => PriceRange::new(min, max)?,
                    None => PriceRange::at_least(min),
                };
            }
            FilterAction::SetMaxPrice(max) => next.price = PriceRange::new(self.price.min(), max)?,
            FilterAction::ToggleCategory(value) => next.toggle(Facet::Category, &value)?,
            FilterAction::ToggleColor(value) => next.toggle(Facet::Color, &value)?,
            FilterAction::ToggleSize(value) => next.toggle(Facet::Size, &value)?,
            FilterAction::ToggleDressStyle(value) => next.toggle(Facet::DressStyle, &value)?,
            FilterAction::SetSearch(text) => next.search = text.trim().to_owned(),
            FilterAction::ClearAll => next = Self::default(),
        }
        Ok(next)
    }

    /// Selected values for `facet`.
    #[must_use]
    pub const fn facet(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Category => &self.categories,
            Facet::Color => &self.colors,
            Facet::Size => &self.sizes,
            Facet::DressStyle => &self.dress_styles,
        }
    }

    /// Whether nothing narrows the result set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty()
            && self.price == PriceRange::default()
            && self.categories.is_empty()
            && self.colors.is_empty()
            && self.sizes.is_empty()
            && self.dress_styles.is_empty()
    }

    const fn facet_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Category => &mut self.categories,
            Facet::Color => &mut self.colors,
            Facet::Size => &mut self.sizes,
            Facet::DressStyle => &mut self.dress_styles,
        }
    }

    fn toggle(&mut self, facet: Facet, value: &str) -> Result<(), FilterError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FilterError::BlankValue);
        }
        if value.contains(',') {
            return Err(FilterError::CommaInValue(value.to_owned()));
        }

        let set = self.facet_mut(facet);
        if !set.remove(value) {
            set.insert(value.to_owned());
        }
        Ok(())
    }
}
