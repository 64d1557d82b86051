//! End-to-end flow through the REST router: load, view, simulate, export.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cltv_api::{router, AppState};
use cltv_core::AppConfig;
use serde_json::{json, Value};
use std::io::Write;
use tower::ServiceExt;

const CSV: &str = "\
customer_id,channel,cost,conversion_rate,revenue
1,referral,5,0.5,105
2,email marketing,10,0.1,110
3,email marketing,20,0.2,60
4,paid advertising,50,0.01,25
";

const CSV_ALL_CHANNELS: &str = "\
customer_id,channel,cost,conversion_rate,revenue
1,referral,5,0.5,105
2,email marketing,10,0.1,110
3,social media,8,0.2,90
4,paid advertising,50,0.01,25
";

fn app_with(config: AppConfig) -> Router {
    router(AppState::new(config))
}

fn app() -> Router {
    app_with(AppConfig::default())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn post_csv(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/datasets")
        .header("content-type", "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn upload(app: &Router) -> String {
    let (status, body) = send_json(app, post_csv(CSV)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["dataset_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_upload_and_dashboard() {
    let app = app();
    let (status, loaded) = send_json(&app, post_csv(CSV)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loaded["status"], "Uploaded CSV loaded • rows: 4 • channels: 3");
    assert_eq!(loaded["meta"]["rows"], 4);
    assert_eq!(loaded["source"]["kind"], "upload");

    let id = loaded["dataset_id"].as_str().unwrap();
    let (status, view) = send_json(&app, get(&format!("/v1/datasets/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["channel_table"][0]["channel"], "referral");
    assert_eq!(view["cost_histogram"]["bins"].as_array().unwrap().len(), 20);
    assert_eq!(view["revenue_share"]["hole"], 0.6);

    let (status, channels) = send_json(&app, get(&format!("/v1/datasets/{id}/channels"))).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = channels
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["channel"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["referral", "email marketing", "paid advertising"]);
}

#[tokio::test]
async fn test_upload_missing_columns_is_bad_request() {
    let app = app();
    let (status, body) = send_json(&app, post_csv("customer_id,channel\n1,referral\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_columns");
    assert!(body["message"].as_str().unwrap().contains("Expected"));
}

#[tokio::test]
async fn test_upload_over_limit_rejected() {
    let mut config = AppConfig::default();
    config.api.max_upload_bytes = 16;
    let app = app_with(config);
    let (status, body) = send_json(&app, post_csv(CSV)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "payload_too_large");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_bad_dataset_id_is_json_bad_request() {
    let app = app();
    let (status, body) = send_json(&app, get("/v1/datasets/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_dataset_id");

    let (status, body) = send_json(&app, get("/v1/datasets/not-a-uuid/export/channels.csv")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_dataset_id");
}

#[tokio::test]
async fn test_simulate_without_body_uses_default_allocation() {
    let app = app();
    let (status, loaded) = send_json(&app, post_csv(CSV_ALL_CHANNELS)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = loaded["dataset_id"].as_str().unwrap();

    let req = Request::builder()
        .method("POST")
        .uri(format!("/v1/datasets/{id}/simulate"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let weights = body["weights"].as_object().unwrap();
    assert_eq!(weights.len(), 4);
    assert_eq!(body["weights"]["referral"], 0.35);
    assert_eq!(body["weights"]["paid advertising"], 0.1);
}

#[tokio::test]
async fn test_simulate_malformed_json_is_json_bad_request() {
    let app = app();
    let id = upload(&app).await;

    let req = Request::builder()
        .method("POST")
        .uri(format!("/v1/datasets/{id}/simulate"))
        .header("content-type", "application/json")
        .body(Body::from("{\"allocation\": "))
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "malformed_request");
}

#[tokio::test]
async fn test_builtin_dataset() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();

    let mut config = AppConfig::default();
    config.data.default_datafile = file.path().display().to_string();
    let app = app_with(config);

    let req = Request::builder()
        .method("POST")
        .uri("/v1/datasets/builtin")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["status"].as_str().unwrap().starts_with("Built-in dataset loaded"));

    let (_, list) = send_json(&app, get("/v1/datasets")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_builtin_missing_file_is_not_found() {
    let mut config = AppConfig::default();
    config.data.default_datafile = "/nonexistent/customer_acquisition_data.csv".to_string();
    let app = app_with(config);
    let req = Request::builder()
        .method("POST")
        .uri("/v1/datasets/builtin")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "dataset_file_not_found");
}

#[tokio::test]
async fn test_simulate() {
    let app = app();
    let id = upload(&app).await;

    let req = Request::builder()
        .method("POST")
        .uri(format!("/v1/datasets/{id}/simulate"))
        .header("content-type", "application/json")
        .body(Body::from(json!({"allocation": {"referral": 100}}).to_string()))
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    // referral avg_roi = 105 / 5
    assert_eq!(body["details"]["new_weighted_roi"], 21.0);
    assert_eq!(body["weights"]["referral"], 1.0);
    assert!(body["summary"].as_str().unwrap().starts_with("**ROI**:"));
}

#[tokio::test]
async fn test_simulate_unknown_channel() {
    let app = app();
    let id = upload(&app).await;

    // The default allocation names "social media", which this dataset lacks.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/v1/datasets/{id}/simulate"))
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown_channel");
}

#[tokio::test]
async fn test_exports() {
    let app = app();
    let id = upload(&app).await;

    let resp = app
        .clone()
        .oneshot(get(&format!("/v1/datasets/{id}/export/customers.csv")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()["content-type"].to_str().unwrap().starts_with("text/csv"));
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("customer_id,channel,cost,conversion_rate,revenue,roi,cltv\n"));
    assert_eq!(text.lines().count(), 5);

    let (status, body) = send(&app, get(&format!("/v1/datasets/{id}/export/channels.csv"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("revenue_share_%"));
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let app = app();
    let id = upload(&app).await;

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/datasets/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(&app, get(&format!("/v1/datasets/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "dataset_not_loaded");
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["datasets_loaded"], 0);
}
