// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use axum::Router;
use billboard_ml_service::config::StorageBackendConfig;
use billboard_ml_service::storage::build_storage;
use tower_http::services::ServeDir;

use crate::common::spawn_server;

#[tokio::test]
async fn test_build_local_backend_and_upload() {
    let source_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let source = source_dir.path().join("annotated_board.jpg");
    tokio::fs::write(&source, b"jpeg").await.unwrap();

    let storage = build_storage(&StorageBackendConfig::Local {
        directory: store_dir.path().to_path_buf(),
        public_base_url: "http://localhost:8000/annotated".to_string(),
    })
    .unwrap();
    assert_eq!(storage.backend_name(), "local");

    let first = storage.upload(&source).await.unwrap();
    let second = storage.upload(&source).await.unwrap();

    // Repeated uploads of the same name never overwrite each other
    assert_ne!(first, second);
    assert_eq!(std::fs::read_dir(store_dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_returned_url_resolves_for_reserved_characters() {
    let source_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();

    let router = Router::new().nest_service("/annotated", ServeDir::new(store_dir.path()));
    let base = spawn_server(router).await;

    let storage = build_storage(&StorageBackendConfig::Local {
        directory: store_dir.path().to_path_buf(),
        public_base_url: format!("{}/annotated", base),
    })
    .unwrap();

    for name in ["annotated_board #1.png", "annotated_50% off?.png", "annotated_plain.png"] {
        let source = source_dir.path().join(name);
        tokio::fs::write(&source, name.as_bytes()).await.unwrap();

        let url = storage.upload(&source).await.unwrap();
        let response = reqwest::get(&url).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK, "GET {}", url);
        assert_eq!(response.bytes().await.unwrap().as_ref(), name.as_bytes());
    }
}
