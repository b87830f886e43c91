use reqwest::StatusCode;
use serde_json::{Value, json};
use vitrina::{OrderedItem, Scope, api::ErrorBody, order::validate};

use super::start_server;
use crate::helpers::*;

async fn error_message(response: reqwest::Response) -> String {
    response
        .json::<ErrorBody>()
        .await
        .expect("error body should be JSON")
        .message
}

#[tokio::test]
async fn test_health_reports_backend() {
    let (server, _backend) = start_server().await;
    let response = reqwest::get(format!("{}/health", server.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].as_str().is_some());
    assert!(body["backend"].as_str().is_some());
}

#[tokio::test]
async fn test_create_and_list_products() {
    let (server, _backend) = start_server().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/admin/home/products", server.url());

    for product_id in [7, 8] {
        let response = client
            .post(&url)
            .json(&json!({ "product_id": product_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let items: Vec<OrderedItem> = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(pairs(&items), vec![(1, 1), (2, 2)]);
    assert_eq!(items[1].payload, vitrina::Payload::product(8));
}

#[tokio::test]
async fn test_create_slide_requires_image() {
    let (server, _backend) = start_server().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/admin/home/carousel", server.url());

    let response = client
        .post(&url)
        .json(&json!({ "title": "No picture" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(response).await.is_empty());

    let response = client
        .post(&url)
        .json(&json!({ "title": "Summer", "image_url": "summer.jpg", "order": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let slide: Value = response.json().await.unwrap();
    assert_eq!(slide["order"], 4);
    assert_eq!(slide["active"], true);
    assert_eq!(slide["image_url"], "summer.jpg");
}

#[tokio::test]
async fn test_create_product_without_product_id() {
    let (server, _backend) = start_server().await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/admin/home/products", server.url()))
        .json(&json!({ "title": "Not a product" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("product_id"));
}

#[tokio::test]
async fn test_reorder_then_list() {
    let (server, backend) = start_server().await;
    seed_products(backend.as_ref(), 3).await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/admin/home/products/order", server.url()))
        .json(&json!([
            { "id": 1, "order": 3 },
            { "id": 2, "order": 2 },
            { "id": 3, "order": 1 }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let items = backend.fetch_collection(Scope::Products).await.unwrap();
    assert_eq!(pairs(&items), vec![(3, 1), (2, 2), (1, 3)]);
    validate(&items).unwrap();
}

#[tokio::test]
async fn test_reorder_unknown_item_is_not_found() {
    let (server, backend) = start_server().await;
    let before = seed_products(backend.as_ref(), 2).await;

    let response = reqwest::Client::new()
        .put(format!("{}/api/admin/home/products/order", server.url()))
        .json(&json!([{ "id": 1, "order": 2 }, { "id": 77, "order": 1 }]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        backend.fetch_collection(Scope::Products).await.unwrap(),
        before
    );
}

#[tokio::test]
async fn test_reorder_rejects_malformed_body() {
    let (server, _backend) = start_server().await;
    let response = reqwest::Client::new()
        .put(format!("{}/api/admin/home/products/order", server.url()))
        .json(&json!({ "id": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(response).await.is_empty());
}

#[tokio::test]
async fn test_delete_item() {
    let (server, backend) = start_server().await;
    seed_slides(backend.as_ref(), 2).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/admin/home/carousel/1", server.url());

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        pairs(&backend.fetch_collection(Scope::Carousel).await.unwrap()),
        vec![(2, 2)]
    );

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(error_message(response).await.contains('1'));
}

#[tokio::test]
async fn test_delete_with_field_clears_image() {
    let (server, backend) = start_server().await;
    seed_slides(backend.as_ref(), 1).await;

    let response = reqwest::Client::new()
        .delete(format!(
            "{}/api/admin/home/carousel/1?field=image_url",
            server.url()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let slide: Value = response.json().await.unwrap();
    assert_eq!(slide["image_url"], Value::Null);
    assert_eq!(slide["order"], 1);

    // Row is still there
    assert_eq!(
        backend.fetch_collection(Scope::Carousel).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_update_item() {
    let (server, backend) = start_server().await;
    seed_slides(backend.as_ref(), 1).await;

    let response = reqwest::Client::new()
        .put(format!("{}/api/admin/home/carousel/1", server.url()))
        .json(&json!({ "title": "Renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let slide: Value = response.json().await.unwrap();
    assert_eq!(slide["title"], "Renamed");
    assert_eq!(slide["image_url"], "slide-1.jpg");
}

#[tokio::test]
async fn test_toggle_hides_from_public_listing() {
    let (server, backend) = start_server().await;
    seed_products(backend.as_ref(), 3).await;
    let client = reqwest::Client::new();

    let response = client
        .patch(format!("{}/api/admin/home/products/2/toggle", server.url()))
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let item: OrderedItem = response.json().await.unwrap();
    assert!(!item.active);

    let public: Vec<OrderedItem> = client
        .get(format!("{}/api/home/products", server.url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pairs(&public), vec![(1, 1), (3, 3)]);

    let admin: Vec<OrderedItem> = client
        .get(format!("{}/api/admin/home/products", server.url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(admin.len(), 3);
}

#[tokio::test]
async fn test_unknown_scope_is_not_found() {
    let (server, _backend) = start_server().await;
    let response = reqwest::get(format!("{}/api/home/banners", server.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(error_message(response).await.contains("banners"));
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let (server, _backend) = start_server().await;
    let response = reqwest::Client::new()
        .delete(format!("{}/api/admin/home/products/abc", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(response).await.is_empty());
}

#[tokio::test]
async fn test_unrouted_path_returns_json_404() {
    let (server, _backend) = start_server().await;
    let response = reqwest::get(format!("{}/api/nowhere", server.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(error_message(response).await.contains("/api/nowhere"));
}

#[tokio::test]
async fn test_wrong_method_returns_json_405() {
    let (server, _backend) = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("{}/api/admin/home/carousel/order", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let message = error_message(response).await;
    assert!(message.contains("DELETE"));
    assert!(message.contains("/api/admin/home/carousel/order"));

    let response = client
        .post(format!("{}/health", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(error_message(response).await.contains("/health"));
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let (server, _backend) = start_server().await;
    let url = format!("{}/health", server.url());
    server.shutdown().await.unwrap();

    assert!(reqwest::get(url).await.is_err());
}
