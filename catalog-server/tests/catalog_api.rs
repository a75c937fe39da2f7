use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use catalog_core::{
    CatalogError,
    api::routes::{
        HEALTH,
        utils::{replace_param, with_query},
        v1,
    },
    application::{
        CatalogUnitOfWork,
        queries::{ReadCatalogBrandsQuery, ReadSingleCatalogItemQuery},
    },
    mediator::{Dispatcher, RequestHandler},
};
use catalog_model::{CatalogBrandViewModel, CatalogItemViewModel};
use catalog_server::{AppState, infra::config::Config, routes::create_app};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

fn server_over(state: AppState) -> TestServer {
    TestServer::new(create_app(state)).expect("test server")
}

fn catalog_server() -> TestServer {
    let uow = CatalogUnitOfWork::in_memory();
    let state = AppState::from_unit_of_work(&uow, Arc::new(Config::default()))
        .expect("catalog dispatcher");
    server_over(state)
}

fn item_route(id: impl ToString) -> String {
    replace_param(v1::catalog::ITEM, "{id}", id.to_string())
}

fn widget() -> Value {
    json!({
        "name": "Widget",
        "description": "A very useful widget",
        "price": 9.99,
        "pictureFileName": "widget.png",
        "availableStock": 3,
        "restockThreshold": 1,
        "maxStockThreshold": 10
    })
}

async fn create_item(server: &TestServer, body: &Value) -> CatalogItemViewModel {
    let response = server.post(v1::catalog::ITEMS).json(body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<CatalogItemViewModel>()
}

fn assert_error_body(body: &Value, status: u16) {
    assert_eq!(body["error"]["status"], json!(status));
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn health_reports_ok() {
    let server = catalog_server();
    let response = server.get(HEALTH).await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_returns_created_with_location_then_reads_back() {
    let server = catalog_server();

    let response = server.post(v1::catalog::ITEMS).json(&widget()).await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    let id = created["id"].as_i64().expect("numeric id");
    assert!(id > 0);
    assert_eq!(created["name"], "Widget");
    assert_eq!(created["price"], json!(9.99));
    assert_eq!(created["catalogBrand"], Value::Null);

    let location = response.header("location");
    assert_eq!(location.to_str().unwrap(), item_route(id));

    let fetched = server.get(&item_route(id)).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>(), created);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let server = catalog_server();
    let response = server.get(&item_route(999)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_body(&response.json::<Value>(), 404);
}

struct CountingReadSingle(Arc<AtomicUsize>);

#[async_trait]
impl RequestHandler<ReadSingleCatalogItemQuery> for CountingReadSingle {
    async fn handle(
        &self,
        _request: ReadSingleCatalogItemQuery,
        _cancel: &CancellationToken,
    ) -> catalog_core::Result<Option<CatalogItemViewModel>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

#[tokio::test]
async fn non_positive_ids_are_rejected_before_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let dispatcher = Dispatcher::builder()
        .register::<ReadSingleCatalogItemQuery, _>(CountingReadSingle(Arc::clone(&calls)))
        .build()
        .expect("dispatcher");
    let server = server_over(AppState::new(
        Arc::new(dispatcher),
        Arc::new(Config::default()),
    ));

    for id in ["0", "-1", "-9223372036854775808"] {
        let response = server.get(&item_route(id)).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_body(&response.json::<Value>(), 400);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    server.get(&item_route(5)).await.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
    let server = catalog_server();
    server
        .get(&item_route("abc"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .delete(&item_route("abc"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    let server = catalog_server();

    for body in [
        json!({ "name": "", "price": 1.0 }),
        json!({ "name": "Widget", "price": -1.0 }),
        json!({ "name": "Widget", "price": 9.999 }),
        json!({ "name": "Widget", "price": 1e17 }),
        json!({ "name": "Widget", "price": 1.0, "availableStock": -3 }),
        json!({ "name": "Widget", "price": 1.0, "catalogBrandId": 42 }),
        json!({ "price": 1.0 }),
    ] {
        let response = server.post(v1::catalog::ITEMS).json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_body(&response.json::<Value>(), 400);
    }

    server
        .post(v1::catalog::ITEMS)
        .text("not json")
        .content_type("application/json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let page = server.get(v1::catalog::ITEMS).await.json::<Vec<Value>>();
    assert!(page.is_empty());
}

#[tokio::test]
async fn update_rejects_prices_the_store_cannot_hold() {
    let server = catalog_server();
    let created = create_item(&server, &widget()).await;

    for price in [json!(0.001), json!(1e16)] {
        let response = server
            .put(&item_route(created.id))
            .json(&json!({ "price": price }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_body(&response.json::<Value>(), 400);
    }

    let fetched = server.get(&item_route(created.id)).await;
    assert_eq!(fetched.json::<CatalogItemViewModel>(), created);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let server = catalog_server();
    let created = create_item(&server, &widget()).await;

    let response = server
        .put(&item_route(created.id))
        .json(&json!({ "name": "Gadget", "availableStock": 7 }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<CatalogItemViewModel>();
    assert_eq!(updated.name, "Gadget");
    assert_eq!(updated.available_stock, 7);
    assert_eq!(updated.price, created.price);
    assert_eq!(updated.description, created.description);

    let fetched = server.get(&item_route(created.id)).await;
    assert_eq!(fetched.json::<CatalogItemViewModel>(), updated);
}

#[tokio::test]
async fn update_of_missing_item_is_not_found_and_creates_nothing() {
    let server = catalog_server();

    for id in ["404", "0", "-5"] {
        server
            .put(&item_route(id))
            .json(&json!({ "name": "Ghost" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    let page = server.get(v1::catalog::ITEMS).await.json::<Vec<Value>>();
    assert!(page.is_empty());
}

#[tokio::test]
async fn delete_removes_then_reports_not_found() {
    let server = catalog_server();
    let created = create_item(&server, &widget()).await;

    server
        .delete(&item_route(created.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&item_route(created.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&item_route(created.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&item_route(0))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_pages_through_items_in_id_order() {
    let server = catalog_server();
    let mut ids = Vec::new();
    for n in 0..5 {
        let mut body = widget();
        body["name"] = json!(format!("Widget {n}"));
        ids.push(create_item(&server, &body).await.id);
    }

    let first = server
        .get(&with_query(v1::catalog::ITEMS, &[("pageSize", "2"), ("pageIndex", "0")]))
        .await
        .json::<Vec<CatalogItemViewModel>>();
    let last = server
        .get(&with_query(v1::catalog::ITEMS, &[("pageSize", "2"), ("pageIndex", "2")]))
        .await
        .json::<Vec<CatalogItemViewModel>>();
    let beyond = server
        .get(&with_query(v1::catalog::ITEMS, &[("pageSize", "2"), ("pageIndex", "9")]))
        .await
        .json::<Vec<CatalogItemViewModel>>();

    assert_eq!(first.iter().map(|i| i.id).collect::<Vec<_>>(), ids[..2]);
    assert_eq!(last.iter().map(|i| i.id).collect::<Vec<_>>(), ids[4..]);
    assert!(beyond.is_empty());

    let defaults = server
        .get(v1::catalog::ITEMS)
        .await
        .json::<Vec<CatalogItemViewModel>>();
    assert_eq!(defaults.len(), 5);
}

#[tokio::test]
async fn out_of_range_paging_is_a_bad_request() {
    let server = catalog_server();
    for query in [
        [("pageSize", "0"), ("pageIndex", "0")],
        [("pageSize", "101"), ("pageIndex", "0")],
        [("pageSize", "10"), ("pageIndex", "-1")],
        [("pageSize", "ten"), ("pageIndex", "0")],
    ] {
        let response = server.get(&with_query(v1::catalog::ITEMS, &query)).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error_body(&response.json::<Value>(), 400);
    }
}

#[tokio::test]
async fn brands_can_be_created_listed_and_referenced() {
    let server = catalog_server();

    let response = server
        .post(v1::catalog::BRANDS)
        .json(&json!({ "brand": "Acme" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let brand = response.json::<CatalogBrandViewModel>();
    assert_eq!(brand.brand, "Acme");

    server
        .post(v1::catalog::BRANDS)
        .json(&json!({ "brand": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let brands = server
        .get(v1::catalog::BRANDS)
        .await
        .json::<Vec<CatalogBrandViewModel>>();
    assert_eq!(brands, vec![brand.clone()]);

    let mut body = widget();
    body["catalogBrandId"] = json!(brand.id.get());
    let item = create_item(&server, &body).await;
    assert_eq!(item.catalog_brand_id, Some(brand.id));
    assert_eq!(item.catalog_brand.as_deref(), Some("Acme"));
}

struct UnreachableStore;

#[async_trait]
impl RequestHandler<ReadCatalogBrandsQuery> for UnreachableStore {
    async fn handle(
        &self,
        _request: ReadCatalogBrandsQuery,
        _cancel: &CancellationToken,
    ) -> catalog_core::Result<Vec<CatalogBrandViewModel>> {
        Err(CatalogError::Connectivity {
            attempts: 16,
            message: "connection refused".to_string(),
        })
    }
}

#[tokio::test]
async fn exhausted_retries_surface_as_service_unavailable() {
    let dispatcher = Dispatcher::builder()
        .register::<ReadCatalogBrandsQuery, _>(UnreachableStore)
        .build()
        .expect("dispatcher");
    let server = server_over(AppState::new(
        Arc::new(dispatcher),
        Arc::new(Config::default()),
    ));

    let response = server.get(v1::catalog::BRANDS).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body = response.json::<Value>();
    assert_error_body(&body, 503);
    assert!(!body["error"]["message"].as_str().unwrap().contains("refused"));
}
