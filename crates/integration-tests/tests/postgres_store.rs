//! Integration tests for `PgProductStore`.
//!
//! These tests require a `PostgreSQL` database named by `TEST_DATABASE_URL`.
//! The catalog is emptied first, so never point it at real data. Everything
//! runs in a single test because the tests share one table.
//!
//! Run with: cargo test -p atelier-integration-tests -- --include-ignored

#![allow(clippy::unwrap_used)]

use atelier_core::{
    FilterCriteria, ListingParams, NewProduct, Price, Product, ProductChanges, ProductQuery, Slug,
};
use atelier_integration_tests::{new_product, postgres_store};
use atelier_storefront::db::{MemoryProductStore, PgProductStore, ProductStore, RepositoryError};

fn catalog() -> Vec<NewProduct> {
    let mut items = vec![
        new_product("Red Shirt", 30),
        new_product("Blue Jeans", 80),
        new_product("Striped 100% Cotton Tee", 25),
        new_product("Linen_Blend Trousers", 95),
        new_product("Party Dress", 120),
    ];
    for (i, item) in items.iter_mut().enumerate() {
        item.popularity = i32::try_from(i).unwrap() * 3;
    }
    if let Some(jeans) = items.get_mut(1) {
        jeans.category = "Jeans".to_owned();
        jeans.colors = vec!["Blue".to_owned(), "Black".to_owned()];
        jeans.sizes = vec!["L".to_owned()];
    }
    if let Some(dress) = items.get_mut(4) {
        dress.category = "Dresses".to_owned();
        dress.dress_style = "Party".to_owned();
        dress.colors = vec!["Red".to_owned()];
    }
    items
}

fn listing(pairs: &[(&str, &str)]) -> ProductQuery {
    let mut params = ListingParams::default();
    for (name, value) in pairs {
        let value = Some((*value).to_owned());
        match *name {
            "page" => params.page = value,
            "limit" => params.limit = value,
            "search" => params.search = value,
            "sort" => params.sort = value,
            "minPrice" => params.min_price = value,
            "maxPrice" => params.max_price = value,
            "categories" => params.categories = value,
            "colors" => params.colors = value,
            "sizes" => params.sizes = value,
            "dressStyles" => params.dress_styles = value,
            other => panic!("unknown listing parameter {other}"),
        }
    }
    ProductQuery::from_criteria(&FilterCriteria::from_params(&params).unwrap())
}

fn slugs(products: &[Product]) -> Vec<String> {
    products.iter().map(|p| p.slug.to_string()).collect()
}

async fn assert_same_listing(
    pg: &PgProductStore,
    memory: &MemoryProductStore,
    query: &ProductQuery,
) {
    let pg_total = pg.count(&query.predicate).await.unwrap();
    let memory_total = memory.count(&query.predicate).await.unwrap();
    assert_eq!(pg_total, memory_total, "count for {query:?}");

    let pg_rows = pg.fetch_window(query).await.unwrap();
    let memory_rows = memory.fetch_window(query).await.unwrap();
    assert_eq!(slugs(&pg_rows), slugs(&memory_rows), "rows for {query:?}");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_postgres_store() {
    let Some(pg) = postgres_store().await else {
        return;
    };

    // Writes
    let memory = MemoryProductStore::new();
    for product in catalog() {
        pg.create(&product).await.unwrap();
        memory.create(&product).await.unwrap();
    }
    assert!(matches!(
        pg.create(&new_product("Red Shirt", 10)).await,
        Err(RepositoryError::Conflict(_))
    ));

    let shirt = pg
        .get_by_slug(&Slug::parse("red-shirt").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shirt.price, Price::from_units(30));

    // Listing parity with the in-memory evaluator. created_at differs
    // between the stores, so only price and popularity sorts are compared.
    for pairs in [
        &[("sort", "priceLowToHigh")][..],
        &[("sort", "priceHighToLow"), ("limit", "2"), ("page", "2")],
        &[("sort", "recommended")],
        &[("sort", "priceLowToHigh"), ("search", "RED")],
        &[("sort", "priceLowToHigh"), ("search", "100%")],
        &[("sort", "priceLowToHigh"), ("search", "_blend")],
        &[("sort", "priceLowToHigh"), ("minPrice", "25"), ("maxPrice", "80")],
        &[("sort", "priceLowToHigh"), ("colors", "Black,Green")],
        &[("sort", "priceLowToHigh"), ("categories", "Jeans,Dresses")],
        &[("sort", "priceLowToHigh"), ("dressStyles", "Party"), ("colors", "Red")],
        &[("sort", "priceLowToHigh"), ("sizes", "M"), ("categories", "")],
        &[("sort", "priceLowToHigh"), ("page", "9")],
    ] {
        assert_same_listing(&pg, &memory, &listing(pairs)).await;
    }

    // Literal wildcard characters only match themselves.
    let query = listing(&[("search", "100%")]);
    assert_eq!(pg.count(&query.predicate).await.unwrap(), 1);

    // Update and delete
    let changed = ProductChanges {
        price: Some(Price::from_units(35)),
        ..ProductChanges::default()
    }
    .apply_to(&shirt)
    .unwrap();
    let updated = pg.update(&changed).await.unwrap();
    assert_eq!(updated.price, Price::from_units(35));
    assert_eq!(updated.created_at, shirt.created_at);

    pg.delete(shirt.id).await.unwrap();
    assert!(matches!(
        pg.delete(shirt.id).await,
        Err(RepositoryError::NotFound)
    ));
    assert!(pg.get(shirt.id).await.unwrap().is_none());

    pg.ping().await.unwrap();
    assert_eq!(pg.clear().await.unwrap(), 4);
}
