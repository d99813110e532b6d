// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use billboard_ml_service::{
    api::{start_server, AppState},
    config::{ServiceArgs, ServiceConfig, StorageBackendConfig},
    pipeline::PredictionPipeline,
    storage::build_storage,
    version,
    vision::{Annotator, YoloDetector},
};
use clap::Parser;
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = ServiceArgs::parse();
    let config = ServiceConfig::from_args(args).context("Invalid configuration")?;

    info!("Starting {}", version::get_version_string());

    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .with_context(|| format!("Failed to create work dir {}", config.work_dir.display()))?;

    // The model is loaded once and shared by all requests
    info!("Loading detector from {}", config.model_path.display());
    let detector = YoloDetector::load(&config.model_path, config.yolo)?;
    info!("Detector ready: {:?}", detector);

    let storage = build_storage(&config.storage).context("Failed to initialize storage")?;
    info!("Artifact storage: {}", storage.backend_name());

    let pipeline = PredictionPipeline::new(
        Arc::new(detector),
        Annotator::with_labels(config.class_labels.clone()),
        storage,
        config.work_dir.clone(),
    );

    let mut state = AppState::new(pipeline);
    if let StorageBackendConfig::Local { directory, .. } = &config.storage {
        tokio::fs::create_dir_all(directory).await?;
        state = state.with_artifact_dir(directory.clone());
    }

    start_server(config.bind_addr, state).await
}
