//! Catalog reads, lookup caching and debounced search.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::http::Method;
use rust_decimal::Decimal;
use serde_json::json;

use bazaar_core::{CategoryId, ProductId, ProductItemId};
use bazaar_integration_tests::TestContext;
use bazaar_storefront::api::{ApiError, ProductQuery};

#[tokio::test]
async fn test_product_list_shapes_are_normalized() {
    let ctx = TestContext::new().await;
    ctx.api.respond(
        Method::GET,
        "/api/products",
        200,
        json!({"count": 1, "next": null, "results": [
            {"id": "3", "title": "Linen Shirt", "price": "29.90",
             "category": {"id": 2, "category_name": "Shirts"},
             "product_items": [{"id": 31, "size_name": "M", "qty_in_stock": 4}]}
        ]}),
    );

    let products = ctx
        .shop
        .catalog()
        .products(&ProductQuery::default())
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    let shirt = &products[0];
    assert_eq!(shirt.id, ProductId::new(3));
    assert_eq!(shirt.name, "Linen Shirt");
    assert_eq!(shirt.category.as_deref(), Some("Shirts"));
    let item = shirt.item(ProductItemId::new(31)).unwrap();
    assert_eq!(item.size.as_deref(), Some("M"));
    assert_eq!(shirt.unit_price(item), Some(Decimal::new(2990, 2)));
}

#[tokio::test]
async fn test_product_detail_and_not_found() {
    let ctx = TestContext::new().await;
    ctx.api.respond(
        Method::GET,
        "/api/products/5",
        200,
        json!({"data": {"id": 5, "name": "Cap", "price": 12}}),
    );

    let cap = ctx.shop.catalog().product(ProductId::new(5)).await.unwrap();
    assert_eq!(cap.name, "Cap");

    let err = ctx
        .shop
        .catalog()
        .product(ProductId::new(6))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Not found.");
}

#[tokio::test]
async fn test_lookup_lists_are_cached() {
    let ctx = TestContext::new().await;
    ctx.api.respond(
        Method::GET,
        "/api/categories",
        200,
        json!({"data": [{"id": 1, "name": "Shirts"}]}),
    );
    ctx.api.respond(
        Method::GET,
        "/api/statuses",
        200,
        json!([{"id": 1, "status": "Pending"}]),
    );

    let catalog = ctx.shop.catalog();
    catalog.categories().await.unwrap();
    let categories = catalog.categories().await.unwrap();
    catalog.statuses().await.unwrap();
    catalog.statuses().await.unwrap();

    assert_eq!(categories[0].id, CategoryId::new(1));
    assert_eq!(ctx.api.hits("/api/categories"), 1);
    assert_eq!(ctx.api.hits("/api/statuses"), 1);

    catalog.invalidate();
    catalog.categories().await.unwrap();
    assert_eq!(ctx.api.hits("/api/categories"), 2);
}

#[tokio::test]
async fn test_failed_lookup_is_not_cached() {
    let ctx = TestContext::new().await;
    ctx.api
        .respond(Method::GET, "/api/countries", 503, serde_json::Value::Null);

    let err = ctx.shop.catalog().countries().await.unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 503, .. }));
    assert_eq!(err.user_message(), "Service Unavailable");

    ctx.api
        .respond(Method::GET, "/api/countries", 200, json!([{"id": 1, "name": "Peru"}]));
    let countries = ctx.shop.catalog().countries().await.unwrap();
    assert_eq!(countries.len(), 1);
    assert_eq!(ctx.api.hits("/api/countries"), 2);
}

#[tokio::test]
async fn test_superseded_search_never_hits_the_api() {
    let ctx = TestContext::with_debounce(Duration::from_millis(100)).await;
    ctx.api.respond(
        Method::GET,
        "/api/products",
        200,
        json!([{"id": 1, "name": "Shirt"}]),
    );

    let search = ctx.shop.search();
    let first = search.search(ProductQuery {
        search: Some("sh".to_string()),
        ..ProductQuery::default()
    });
    let second = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        search
            .search(ProductQuery {
                search: Some("  shirt ".to_string()),
                category: Some(CategoryId::new(2)),
                page: None,
            })
            .await
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.unwrap().is_none());
    assert_eq!(second.unwrap().unwrap().len(), 1);

    let requests = ctx.api.requests_to("/api/products");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("search=shirt&category=2"));
}

#[tokio::test]
async fn test_blank_search_lists_everything() {
    let ctx = TestContext::new().await;
    ctx.api
        .respond(Method::GET, "/api/products", 200, json!([]));

    let products = ctx
        .shop
        .search()
        .search(ProductQuery {
            search: Some("   ".to_string()),
            ..ProductQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(products, Some(Vec::new()));
    assert_eq!(ctx.api.requests_to("/api/products")[0].query, None);
}
