// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Name of the loaded detector model
    pub detector: String,
    /// Active artifact storage backend
    pub storage: String,
    pub features: Vec<String>,
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        detector: state.pipeline.detector_name().to_string(),
        storage: state.pipeline.storage_backend().to_string(),
        features: version::FEATURES.iter().map(|f| f.to_string()).collect(),
    })
}
