use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, HttpRequest};
use serde_json::{json, Value};
use std::sync::Arc;

use products_api::db::{InMemoryRepository, ProductRepository};
use products_api::links::LinkGenerator;
use products_api::mock_data::{self, PLACEHOLDER_JPEG};
use products_api::models::{CategoryView, ProductDetail, ProductForm, ProductView};
use products_api::routes;
use products_api::startup::AppState;

fn seeded_state() -> (web::Data<AppState>, Arc<InMemoryRepository>) {
    let repository = Arc::new(InMemoryRepository::new());
    mock_data::seed(&repository).unwrap();
    (web::Data::new(AppState::new(repository.clone())), repository)
}

fn header_value(resp: &actix_web::dev::ServiceResponse, name: &str) -> String {
    resp.headers()
        .get(name)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

fn new_product_body() -> Value {
    json!({
        "name": "Touring Tire",
        "productNumber": "TT-T092",
        "color": "Black",
        "size": null,
        "weight": null,
        "standardCost": 10.84,
        "listPrice": 28.99,
        "sellStartDate": "2007-07-01T00:00:00",
        "sellEndDate": null,
        "productCategoryId": 18,
        "productModelId": null
    })
}

#[actix_web::test]
async fn test_get_products() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/api/products").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_value(&resp, "X-Total-Count"), "4");
    assert_eq!(header_value(&resp, "page-size"), "5");

    let products: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(products.len(), 4);

    let frame = &products[0];
    assert_eq!(frame["name"], "HL Road Frame");
    assert_eq!(frame["color"], "Black");
    assert_eq!(frame["standardCost"], 1059.31);
    assert_eq!(frame["description"], frame["catalog"]);
    assert_eq!(
        frame["category"],
        json!({"name": "Road Frames", "parentCategory": "Components"})
    );

    let sample = &products[3];
    assert_eq!(sample["name"], Value::Null);
    assert_eq!(sample["category"], json!({"name": null, "parentCategory": null}));
}

#[actix_web::test]
async fn test_filter_products() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/products?$filter=Color%20eq%20'Red'")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_value(&resp, "X-Total-Count"), "1");
    assert_eq!(header_value(&resp, "page-size"), "5");

    let products: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Road-150");

    let req = test::TestRequest::get()
        .uri("/api/products?$filter=Category/ParentCategory%20eq%20'Bikes'")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(header_value(&resp, "X-Total-Count"), "2");
}

#[actix_web::test]
async fn test_sort_and_select_products() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/products?$orderby=StandardCost%20desc&$select=Color,StandardCost")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let products: Vec<Value> = test::read_body_json(resp).await;
    let costs: Vec<f64> = products
        .iter()
        .map(|p| p["standardCost"].as_f64().unwrap())
        .collect();
    assert_eq!(costs, vec![2171.29, 1912.15, 1059.31, 12.0]);
    assert_eq!(products[0], json!({"color": "Red", "standardCost": 2171.29}));
}

#[actix_web::test]
async fn test_paging_keeps_total_count() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/products?$skip=1&$top=2")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(header_value(&resp, "X-Total-Count"), "4");

    let products: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["color"], "Red");
}

#[actix_web::test]
async fn test_invalid_query_options() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    for uri in [
        "/api/products?$filter=Color%20eq",
        "/api/products?$filter=nope(Color)",
        "/api/products?$orderby=Color%20sideways",
        "/api/products?$select=Price",
        "/api/products?$top=-1",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_deeply_nested_filter_is_rejected() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let nested = format!(
        "/api/products?$filter={}Color%20eq%20'Red'{}",
        "%28".repeat(5000),
        "%29".repeat(5000)
    );
    let chained = format!(
        "/api/products?$filter={}",
        vec!["Color%20eq%20'Red'"; 600].join("%20or%20")
    );
    for uri in [nested, chained] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().is_some_and(|m| m.contains("expression")));
    }

    let req = test::TestRequest::get()
        .uri("/api/products?$filter=((((Color%20eq%20'Red'))))")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_get_by_name_returns_first_product() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/products/GetByName/Mountain-100%20Silver,%2038")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let product: ProductView = test::read_body_json(resp).await;
    assert_eq!(product.id, 680);
    assert_eq!(product.name, "HL Road Frame - Black, 58");
}

#[actix_web::test]
async fn test_get_by_name_on_empty_store() {
    let state = web::Data::new(AppState::new(Arc::new(InMemoryRepository::new())));
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/products/GetByName/anything")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_get_product() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/api/products/749").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let product: ProductDetail = test::read_body_json(resp).await;
    assert_eq!(product.name, "Road-150 Red, 62");
    assert_eq!(product.color.as_deref(), Some("Red"));
    assert_eq!(product.list_price, 3578.27);
    assert_eq!(product.category.as_deref(), Some("Road Bikes"));
    assert_eq!(product.links.len(), 1);

    let link = &product.links[0];
    assert_eq!(link.rel, "self");
    assert_eq!(link.method, "GET");
    let href = link.href.as_deref().unwrap();
    assert!(href.starts_with("http"));
    assert!(href.ends_with("/api/categories/6"));
}

#[actix_web::test]
async fn test_product_link_resolves_to_category() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/api/products/771").to_request();
    let product: ProductDetail = test::call_and_read_body_json(&app, req).await;
    let href = product.links[0].href.clone().unwrap();
    let path = &href[href.find("/api/").unwrap()..];

    let req = test::TestRequest::get().uri(path).to_request();
    let category: CategoryView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(category.id, 5);
    assert_eq!(category.name, "Mountain Bikes");
    assert_eq!(category.parent_category.as_deref(), Some("Bikes"));
}

#[actix_web::test]
async fn test_get_product_without_category_has_no_links() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/api/products/1001").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["category"], Value::Null);
    assert_eq!(body["links"], json!([]));
    assert_eq!(body["listPrice"], 20.0);
    assert!(body.get("modifiedDate").is_some());
}

struct NoLinks;

impl LinkGenerator for NoLinks {
    fn absolute_url(&self, _: &HttpRequest, _: &str, _: &str, _: &[String]) -> Option<String> {
        None
    }
}

#[actix_web::test]
async fn test_link_kept_when_url_cannot_be_built() {
    let (state, _) = seeded_state();
    let state = web::Data::new(state.get_ref().clone().with_links(Arc::new(NoLinks)));
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/api/products/680").to_request();
    let product: ProductDetail = test::call_and_read_body_json(&app, req).await;
    assert_eq!(product.links.len(), 1);
    assert_eq!(product.links[0].href, None);
}

#[actix_web::test]
async fn test_get_nonexistent_product() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let requests = [
        test::TestRequest::get().uri("/api/products/99999"),
        test::TestRequest::get().uri("/api/products/99999/thumbnail"),
        test::TestRequest::delete().uri("/api/products/99999"),
        test::TestRequest::put()
            .uri("/api/products/99999")
            .set_json(new_product_body()),
        test::TestRequest::get().uri("/api/products/not-a-number"),
        test::TestRequest::get().uri("/api/categories/99999"),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn test_get_thumbnail() {
    let (state, _) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/products/749/thumbnail")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_value(&resp, "content-type"), "image/jpeg");
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), PLACEHOLDER_JPEG);

    // product exists but has no thumbnail
    let req = test::TestRequest::get()
        .uri("/api/products/680/thumbnail")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_product() {
    let (state, repository) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/products")
        .set_json(new_product_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let location = header_value(&resp, header::LOCATION.as_str());
    assert!(location.ends_with("/api/products/1002"));

    let echoed: ProductForm = test::read_body_json(resp).await;
    assert_eq!(echoed.name, "Touring Tire");
    assert_eq!(repository.product_count().unwrap(), 5);

    let path = &location[location.find("/api/").unwrap()..];
    let req = test::TestRequest::get().uri(path).to_request();
    let product: ProductDetail = test::call_and_read_body_json(&app, req).await;
    assert_eq!(product.name, "Touring Tire");
    assert_eq!(product.category.as_deref(), Some("Road Frames"));
}

#[actix_web::test]
async fn test_create_product_validation() {
    let (state, repository) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let mut missing_name = new_product_body();
    missing_name.as_object_mut().unwrap().remove("name");

    let mut empty_name = new_product_body();
    empty_name["name"] = json!("  ");

    let mut negative_price = new_product_body();
    negative_price["listPrice"] = json!(-1.0);

    let mut ends_before_start = new_product_body();
    ends_before_start["sellEndDate"] = json!("2001-01-01T00:00:00");

    for body in [missing_name, empty_name, negative_price, ends_before_start] {
        let req = test::TestRequest::post()
            .uri("/api/products")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", body);
    }

    let req = test::TestRequest::post()
        .uri("/api/products")
        .insert_header(header::ContentType::json())
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(repository.product_count().unwrap(), 4);
}

#[actix_web::test]
async fn test_create_product_with_unknown_references() {
    let (state, repository) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let mut unknown_category = new_product_body();
    unknown_category["productCategoryId"] = json!(99999);

    let mut unknown_model = new_product_body();
    unknown_model["productModelId"] = json!(99999);

    let mut duplicate_number = new_product_body();
    duplicate_number["productNumber"] = json!("FR-R92B-58");

    for body in [unknown_category, unknown_model, duplicate_number] {
        let req = test::TestRequest::post()
            .uri("/api/products")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", body);

        let error: Value = test::read_body_json(resp).await;
        assert_ne!(error["message"], "Internal Server Error");
    }
    assert_eq!(repository.product_count().unwrap(), 4);

    let mut known_model = new_product_body();
    known_model["productModelId"] = json!(6);
    let req = test::TestRequest::post()
        .uri("/api/products")
        .set_json(&known_model)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(repository.product_count().unwrap(), 5);
}

#[actix_web::test]
async fn test_update_product() {
    let (state, repository) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let before = ProductRepository::get(repository.as_ref(), 749)
        .unwrap()
        .unwrap()
        .product;

    let mut body = new_product_body();
    body["name"] = json!("Road-150 Blue, 62");
    body["color"] = json!("Blue");
    body["standardCost"] = json!(1.0);
    body["listPrice"] = json!(2.0);

    let req = test::TestRequest::put()
        .uri("/api/products/749")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let after = ProductRepository::get(repository.as_ref(), 749)
        .unwrap()
        .unwrap()
        .product;
    assert_eq!(after.name, "Road-150 Blue, 62");
    assert_eq!(after.color.as_deref(), Some("Blue"));
    assert_eq!(after.standard_cost, before.standard_cost);
    assert_eq!(after.list_price, before.list_price);
    assert_eq!(after.weight, before.weight);
    assert_eq!(after.product_number, before.product_number);
    assert_eq!(after.thumbnail_photo, before.thumbnail_photo);
}

#[actix_web::test]
async fn test_update_product_validation() {
    let (state, repository) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let mut body = new_product_body();
    body["name"] = json!("");

    let req = test::TestRequest::put()
        .uri("/api/products/749")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let stored = ProductRepository::get(repository.as_ref(), 749)
        .unwrap()
        .unwrap()
        .product;
    assert_eq!(stored.name, "Road-150 Red, 62");
}

#[actix_web::test]
async fn test_delete_product() {
    let (state, repository) = seeded_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::delete().uri("/api/products/680").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(repository.product_count().unwrap(), 3);

    let req = test::TestRequest::get().uri("/api/products/680").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/products").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(header_value(&resp, "X-Total-Count"), "3");
}
