// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handlers

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{debug, warn};

use super::request::PredictFromUrlRequest;
use super::response::PredictResponse;
use crate::api::http_server::AppState;
use crate::pipeline::{PipelineError, UploadedImage};

/// POST /predict/ - Detect, annotate and store an uploaded image
///
/// # Request
/// Multipart form; the first field with a file name is the image.
///
/// # Response
/// - `detections`: `{class, confidence, xyxy}` per detection
/// - `annotated_image_url`: durable URL of the annotated copy
///
/// # Errors
/// - 500 Internal Server Error: `{"error": ...}` for a failure in any stage
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, PipelineError> {
    let multipart = multipart.map_err(|e| {
        warn!("Rejected multipart request: {}", e);
        PipelineError::Ingress(e.body_text())
    })?;

    let upload = read_upload(multipart).await?;
    debug!("Received {} ({} bytes)", upload.filename, upload.bytes.len());

    let outcome = state.pipeline.run(upload).await?;
    Ok(Json(outcome.into()))
}

/// POST /predict_from_url/ - Same pipeline for an image fetched by URL
pub async fn predict_from_url_handler(
    State(state): State<AppState>,
    request: Result<Json<PredictFromUrlRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, PipelineError> {
    let Json(request) = request.map_err(|e| PipelineError::Ingress(e.body_text()))?;

    let outcome = state.pipeline.run_from_url(&request.url).await?;
    Ok(Json(outcome.into()))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadedImage, PipelineError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::Ingress(e.to_string()))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| PipelineError::Ingress(e.to_string()))?;
        return Ok(UploadedImage::new(filename, bytes.to_vec()));
    }

    Err(PipelineError::Ingress("no file field in form".to_string()))
}
