// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::health::health_handler;
use super::predict::{predict_from_url_handler, predict_handler};
use crate::pipeline::PredictionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    /// Directory served at `/annotated` when artifacts are stored locally
    pub artifact_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(pipeline: PredictionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            artifact_dir: None,
        }
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }
}

/// Build the service router
pub fn create_app(state: AppState) -> Router {
    let artifact_dir = state.artifact_dir.clone();

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/predict/", post(predict_handler))
        .route("/predict", post(predict_handler))
        .route("/predict_from_url/", post(predict_from_url_handler))
        .route("/predict_from_url", post(predict_from_url_handler))
        .with_state(state);

    if let Some(dir) = artifact_dir {
        app = app.nest_service("/annotated", ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::disable())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Prediction service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Prediction service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
