//! Filter state to request descriptor.
//!
//! Encoding is total and deterministic: every parameter is always present,
//! facet sets are comma-joined in sorted order and empty sets encode as an
//! empty string, which the server reads as "no constraint".

use std::collections::BTreeSet;

use atelier_core::{ListingParams, Price};

use crate::filter_state::FilterState;

/// Encode `state` for page `page` of size `limit`.
#[must_use]
pub fn encode(state: &FilterState, page: u32, limit: u32) -> ListingParams {
    ListingParams {
        page: Some(page.to_string()),
        limit: Some(limit.to_string()),
        search: Some(state.search.clone()),
        sort: Some(state.sort.as_param().to_owned()),
        categories: Some(join(&state.categories)),
        colors: Some(join(&state.colors)),
        sizes: Some(join(&state.sizes)),
        dress_styles: Some(join(&state.dress_styles)),
        min_price: Some(price_param(state.price.min())),
        max_price: Some(price_param(state.price.max())),
    }
}

/// Render `params` as a URL query string.
#[must_use]
pub fn to_query_string(params: &ListingParams) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.pairs())
        .finish()
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

fn price_param(price: Price) -> String {
    price.amount().normalize().to_string()
}
