//! Filter predicate: the conjunction of clauses derived from criteria.

use crate::product::Product;
use crate::types::Price;

use super::FilterCriteria;

/// A set-valued product attribute that can be filtered by membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetField {
    /// Single-valued `category`.
    Category,
    /// Single-valued `dress_style`.
    DressStyle,
    /// Multi-valued `colors`.
    Colors,
    /// Multi-valued `sizes`.
    Sizes,
}

impl SetField {
    /// The column backing this attribute.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::DressStyle => "dress_style",
            Self::Colors => "colors",
            Self::Sizes => "sizes",
        }
    }

    /// Whether the attribute holds a list of values on each product.
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::Colors | Self::Sizes)
    }

    fn product_values(self, product: &Product) -> &[String] {
        match self {
            Self::Category => core::slice::from_ref(&product.category),
            Self::DressStyle => core::slice::from_ref(&product.dress_style),
            Self::Colors => &product.colors,
            Self::Sizes => &product.sizes,
        }
    }
}

/// One conjunct of a [`Predicate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `price >= bound`
    PriceAtLeast(Price),
    /// `price <= bound`
    PriceAtMost(Price),
    /// Case-insensitive substring match on name or description.
    Search(String),
    /// The attribute shares at least one value with `values`.
    AnyOf {
        field: SetField,
        values: Vec<String>,
    },
}

impl Clause {
    /// Evaluate the clause against a product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::PriceAtLeast(bound) => product.price >= *bound,
            Self::PriceAtMost(bound) => product.price <= *bound,
            Self::Search(term) => {
                let needle = term.to_lowercase();
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            }
            Self::AnyOf { field, values } => field
                .product_values(product)
                .iter()
                .any(|value| values.contains(value)),
        }
    }
}

/// Conjunction of clauses. An empty predicate matches every product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Build the predicate for `criteria`.
    ///
    /// Default-valued criteria contribute nothing: an unconstrained price
    /// range adds no price clause and empty sets add no membership clause.
    #[must_use]
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut clauses = Vec::new();

        if let Some(min) = criteria.price.lower_bound() {
            clauses.push(Clause::PriceAtLeast(min));
        }
        if let Some(max) = criteria.price.upper_bound() {
            clauses.push(Clause::PriceAtMost(max));
        }
        if let Some(term) = &criteria.search {
            clauses.push(Clause::Search(term.clone()));
        }

        let sets = [
            (SetField::Category, &criteria.categories),
            (SetField::Colors, &criteria.colors),
            (SetField::Sizes, &criteria.sizes),
            (SetField::DressStyle, &criteria.dress_styles),
        ];
        for (field, values) in sets {
            if !values.is_empty() {
                clauses.push(Clause::AnyOf {
                    field,
                    values: values.iter().cloned().collect(),
                });
            }
        }

        Self { clauses }
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether `product` satisfies every clause.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.clauses.iter().all(|clause| clause.matches(product))
    }
}

/// Build an `ILIKE` pattern that matches `term` literally anywhere in a value.
///
/// `%`, `_` and `\` are escaped with a backslash, the default escape character
/// for `LIKE` in Postgres.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
