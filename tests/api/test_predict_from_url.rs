// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict_from_url/ tests against a loopback image host

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use billboard_ml_service::api::{create_app, AppState};
use billboard_ml_service::vision::{BoundingBox, Detection};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use crate::common::{
    pipeline, png_bytes, remaining_files, solid_image, spawn_server, FixedDetector,
    RecordingStorage,
};

async fn image_host() -> String {
    let image = png_bytes(&solid_image(40, 30, [200, 200, 200]));
    let router = Router::new().route(
        "/uploads/billboards/board.png",
        get(move || {
            let image = image.clone();
            async move { ([(header::CONTENT_TYPE, "image/png")], image) }
        }),
    );
    spawn_server(router).await
}

fn url_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict_from_url/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_predict_from_url_runs_pipeline() {
    let host = image_host().await;
    let work_dir = tempfile::tempdir().unwrap();
    let detector = Arc::new(FixedDetector::new(vec![Detection::new(
        1,
        0.66,
        BoundingBox::new(4.0, 8.0, 20.0, 25.0),
    )]));
    let storage = Arc::new(RecordingStorage::default());
    let app = create_app(AppState::new(pipeline(
        detector.clone(),
        storage.clone(),
        work_dir.path(),
    )));

    let response = app
        .oneshot(url_request(json!({
            "url": format!("{}/uploads/billboards/board.png", host)
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["detections"][0]["class"], 1);
    assert_eq!(
        body["annotated_image_url"],
        "https://storage.test/annotated_board.png"
    );

    assert_eq!(detector.seen()[0].0, work_dir.path().join("temp_board.png"));
    assert_eq!(storage.uploads().len(), 1);
    assert!(remaining_files(work_dir.path()).is_empty());
}

#[tokio::test]
async fn test_predict_from_url_not_found() {
    let host = image_host().await;
    let work_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::default());
    let app = create_app(AppState::new(pipeline(
        Arc::new(FixedDetector::new(vec![])),
        storage.clone(),
        work_dir.path(),
    )));

    let response = app
        .oneshot(url_request(json!({ "url": format!("{}/missing.png", host) })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Failed to fetch image"));
    assert!(storage.uploads().is_empty());
}

#[tokio::test]
async fn test_predict_from_url_missing_url_field() {
    let work_dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(pipeline(
        Arc::new(FixedDetector::new(vec![])),
        Arc::new(RecordingStorage::default()),
        work_dir.path(),
    )));

    let response = app.oneshot(url_request(json!({ "link": "x" }))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["error"].is_string());
}
