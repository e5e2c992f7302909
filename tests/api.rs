use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bigdecimal::BigDecimal;
use billsmart::api::{router, AppState, ItemsResponse, StoreList};
use billsmart::config::{BillingConfig, StorageConfig, StoreConfig};
use billsmart::models::{AgeRestriction, VideoList, VideoUpload};
use billsmart::service::{
    BillingService, CatalogRegistry, FileStore, FixedClassifier, PriceCatalog, StaticDetector,
};
use billsmart::{Detection, LineItem};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "billsmart-test-boundary";

async fn app(dir: &std::path::Path, detections: Vec<Detection>) -> Router {
    let storage = StorageConfig {
        upload_dir: dir.join("uploads").to_string_lossy().into_owned(),
        bill_dir: dir.join("bills").to_string_lossy().into_owned(),
        video_dir: dir.join("videos").to_string_lossy().into_owned(),
    };
    let catalogs = Arc::new(CatalogRegistry::new("XYZ Supermarket", PriceCatalog::builtin()));
    let billing = BillingService::new(
        catalogs,
        Arc::new(StaticDetector::new(detections)),
        &BillingConfig::default(),
        StoreConfig::default(),
    );
    let state = AppState {
        billing: Arc::new(billing),
        classifier: Arc::new(FixedClassifier::new(AgeRestriction::AR13)),
        files: FileStore::open(&storage).await.unwrap(),
        db: None,
    };
    router(state, 10 * 1024 * 1024)
}

fn multipart(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn root_and_health() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![]).await;

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["BillSmart"], "Welcome to BillSmart API");

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn process_image_prices_detections_and_cleans_up() {
    let tmp = tempfile::tempdir().unwrap();
    let detections = vec![
        Detection::new("Fanta", 0.92),
        Detection::new("Lays", 0.5),
        Detection::new(" Mixed Fruit", 0.7),
    ];
    let app = app(tmp.path(), detections).await;

    let response = app
        .oneshot(multipart("/process_image/", "shelf.jpg", b"\xff\xd8jpeg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ItemsResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(
        body.items,
        vec![
            LineItem::new("Fanta", 1, BigDecimal::from(45)).unwrap(),
            LineItem::new(" Mixed Fruit", 1, BigDecimal::from(90)).unwrap(),
        ]
    );

    let leftovers = std::fs::read_dir(tmp.path().join("uploads")).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn process_image_sends_numeric_prices() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![Detection::new("Fanta", 0.92)]).await;

    let response = app
        .oneshot(multipart("/process_image/", "shelf.jpg", b"jpeg"))
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["items"][0]["price"].is_number());
    assert_eq!(body["items"][0], serde_json::json!({"name": "Fanta", "count": 1, "price": 45}));
}

#[tokio::test]
async fn process_image_falls_back_to_placeholder() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![Detection::new("Fanta", 0.1)]).await;

    let response = app
        .oneshot(multipart("/process_image/", "shelf.png", b"png"))
        .await
        .unwrap();
    let body: ItemsResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let names: Vec<&str> = body.items.iter().map(|i| i.name()).collect();
    assert_eq!(names, vec!["Apple", "Banana", "Milk"]);
}

#[tokio::test]
async fn generate_bill_returns_pdf_and_saves_it() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![]).await;

    let response = app
        .clone()
        .oneshot(json_post(
            "/generate_bill/",
            r#"[{"name":"Bottle","count":2,"price":10},{"name":"Fanta","count":1,"price":45}]"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bill_id = response.headers()["x-bill-id"].to_str().unwrap().to_string();

    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF"));
    assert!(String::from_utf8_lossy(&pdf).contains("Rs. 65.00"));

    let response = app
        .oneshot(get(&format!("/download_bill/{}", bill_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, pdf);
}

#[tokio::test]
async fn generate_bill_rejects_empty_and_invalid_items() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![]).await;

    let response = app.clone().oneshot(json_post("/generate_bill/", "[]")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["message"], "No items provided");
    assert_eq!(std::fs::read_dir(tmp.path().join("bills")).unwrap().count(), 0);

    let response = app
        .oneshot(json_post("/generate_bill/", r#"[{"name":"Bottle","count":0,"price":10}]"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_csv_bill() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![]).await;

    let response = app
        .oneshot(json_post("/generate_bill/csv", r#"[{"name":"Harpic","count":3,"price":95}]"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("Harpic,3,₹95.00,₹285.00"));
    assert!(text.contains("Total Amount,₹285.00"));
}

#[tokio::test]
async fn missing_bill_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![]).await;

    let response = app.oneshot(get("/download_bill/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_endpoints() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![]).await;

    let response = app.clone().oneshot(get("/catalog")).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body[" Mixed Fruit"], serde_json::json!(90));
    assert!(body.get("Mixed Fruit").is_none());

    let response = app.clone().oneshot(get("/stores")).await.unwrap();
    let list: StoreList = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(list.stores, vec!["XYZ Supermarket"]);

    let response = app
        .clone()
        .oneshot(get("/stores/XYZ%20Supermarket/catalog"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/stores/Nowhere/catalog")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn video_upload_list_fetch_delete() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path(), vec![]).await;

    let response = app
        .clone()
        .oneshot(multipart("/upload/", "clip.mp4", b"video-bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let upload: VideoUpload = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(upload.filename.ends_with(".mp4"));
    assert_eq!(upload.age_restriction, AgeRestriction::AR13);

    let response = app.clone().oneshot(get("/videos/")).await.unwrap();
    let list: VideoList = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(list.videos, vec![upload.filename.clone()]);

    let response = app
        .clone()
        .oneshot(get(&format!("/video/{}", upload.filename)))
        .await
        .unwrap();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(body_bytes(response).await, b"video-bytes");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/video/{}", upload.filename))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get(&format!("/video/{}", upload.filename))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
