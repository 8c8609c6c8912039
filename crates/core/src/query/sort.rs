//! Total result ordering.

use core::cmp::Ordering;

use crate::product::Product;

use super::SortKey;

/// A sortable product attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    CreatedAt,
    Popularity,
    Price,
    Id,
}

impl SortField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Popularity => "popularity",
            Self::Price => "price",
            Self::Id => "id",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::Popularity => a.popularity.cmp(&b.popularity),
            Self::Price => a.price.cmp(&b.price),
            Self::Id => a.id.cmp(&b.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordered list of sort terms. Always ends with `id ASC`, so the ordering is
/// total and offset pagination never skips or repeats a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    terms: Vec<(SortField, Direction)>,
}

impl SortSpec {
    #[must_use]
    pub fn for_key(key: SortKey) -> Self {
        let primary = match key {
            SortKey::Newest => (SortField::CreatedAt, Direction::Desc),
            SortKey::Recommended => (SortField::Popularity, Direction::Desc),
            SortKey::PriceAsc => (SortField::Price, Direction::Asc),
            SortKey::PriceDesc => (SortField::Price, Direction::Desc),
        };
        Self {
            terms: vec![primary, (SortField::Id, Direction::Asc)],
        }
    }

    #[must_use]
    pub fn terms(&self) -> &[(SortField, Direction)] {
        &self.terms
    }

    /// Compare two products under this ordering.
    #[must_use]
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        for (field, direction) in &self.terms {
            let ord = field.compare(a, b);
            let ord = match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// `ORDER BY` body, e.g. `created_at DESC, id ASC`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.terms
            .iter()
            .map(|(field, direction)| format!("{} {}", field.column(), direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::for_key(SortKey::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::tests::sample_product;

    #[test]
    fn test_every_key_ends_with_id_tiebreak() {
        for key in [
            SortKey::Newest,
            SortKey::Recommended,
            SortKey::PriceAsc,
            SortKey::PriceDesc,
        ] {
            let spec = SortSpec::for_key(key);
            assert_eq!(spec.terms().last(), Some(&(SortField::Id, Direction::Asc)));
        }
    }

    #[test]
    fn test_sql_rendering() {
        assert_eq!(SortSpec::default().to_sql(), "created_at DESC, id ASC");
        assert_eq!(
            SortSpec::for_key(SortKey::PriceAsc).to_sql(),
            "price ASC, id ASC"
        );
        assert_eq!(
            SortSpec::for_key(SortKey::Recommended).to_sql(),
            "popularity DESC, id ASC"
        );
    }

    #[test]
    fn test_equal_prices_tiebreak_on_id() {
        let spec = SortSpec::for_key(SortKey::PriceDesc);
        let mut products = vec![
            sample_product(3, "C", 10),
            sample_product(1, "A", 10),
            sample_product(2, "B", 30),
        ];
        products.sort_by(|a, b| spec.compare(a, b));
        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_newest_first() {
        let spec = SortSpec::default();
        let mut products = vec![sample_product(1, "Old", 5), sample_product(2, "New", 5)];
        products.sort_by(|a, b| spec.compare(a, b));
        assert_eq!(products[0].name, "New");
    }
}
