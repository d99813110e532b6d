// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request-to-response prediction pipeline
//!
//! Each request moves through
//! `Received → Saved → Inferred → Annotated → Uploaded → Responded`, or
//! stops at the first failing stage. Temporary files are owned by guards and
//! removed before `run` returns on every path.

pub mod errors;
pub mod ingress;
pub mod temp_files;

use image::ImageFormat;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use errors::PipelineError;
pub use ingress::{fetch_remote_image, UploadedImage};
pub use temp_files::ScopedTempFile;

use crate::storage::ArtifactStorage;
use crate::vision::image_utils::{
    decode_image_file, detect_format, encode_image_file, format_to_extension, output_format,
};
use crate::vision::{Annotator, Detection, Detector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Saved,
    Inferred,
    Annotated,
    Uploaded,
    Responded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Saved => "saved",
            PipelineStage::Inferred => "inferred",
            PipelineStage::Annotated => "annotated",
            PipelineStage::Uploaded => "uploaded",
            PipelineStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Successful pipeline result
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    /// Every detection drawn on the stored image, in drawing order
    pub detections: Vec<Detection>,
    pub annotated_image_url: String,
}

pub struct PredictionPipeline {
    detector: Arc<dyn Detector>,
    annotator: Arc<Annotator>,
    storage: Arc<dyn ArtifactStorage>,
    work_dir: PathBuf,
    http: reqwest::Client,
}

impl PredictionPipeline {
    pub fn new(
        detector: Arc<dyn Detector>,
        annotator: Annotator,
        storage: Arc<dyn ArtifactStorage>,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            detector,
            annotator: Arc::new(annotator),
            storage,
            work_dir,
            http: reqwest::Client::new(),
        }
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    pub fn storage_backend(&self) -> &'static str {
        self.storage.backend_name()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Run all stages for one uploaded image
    pub async fn run(&self, upload: UploadedImage) -> Result<PredictionOutcome, PipelineError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        debug!(%request_id, filename = %upload.filename, "stage {}", PipelineStage::Received);

        match self.execute(request_id, upload).await {
            Ok(outcome) => {
                info!(
                    %request_id,
                    "Prediction complete: {} detections, {}ms",
                    outcome.detections.len(),
                    started.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(e) => {
                warn!(%request_id, stage = %e.stage(), "Prediction failed: {}", e);
                Err(e)
            }
        }
    }

    /// Download `url` and run it through the same stages as an upload
    pub async fn run_from_url(&self, url: &str) -> Result<PredictionOutcome, PipelineError> {
        let upload = match fetch_remote_image(&self.http, url).await {
            Ok(upload) => upload,
            Err(e) => {
                warn!(url, "Prediction failed before ingress: {}", e);
                return Err(e);
            }
        };
        self.run(upload).await
    }

    async fn execute(
        &self,
        request_id: Uuid,
        upload: UploadedImage,
    ) -> Result<PredictionOutcome, PipelineError> {
        // Ingress
        let source = ScopedTempFile::create(&self.work_dir, "temp", &upload.filename, &upload.bytes)
            .await
            .map_err(|e| PipelineError::Ingress(e.to_string()))?;
        let output_name =
            annotated_filename(source_filename(source.path()), detect_format(&upload.bytes).ok());
        drop(upload);
        debug!(%request_id, "stage {}", PipelineStage::Saved);

        // Inference
        let detector = Arc::clone(&self.detector);
        let source_path = source.path().to_path_buf();
        let detections = tokio::task::spawn_blocking(move || detector.predict(&source_path))
            .await
            .map_err(|e| PipelineError::task(PipelineStage::Saved, e))?
            .map_err(PipelineError::Inference)?;
        debug!(%request_id, detections = detections.len(), "stage {}", PipelineStage::Inferred);

        // Annotation
        let output = ScopedTempFile::reserve(&self.work_dir, "annotated", &output_name);
        let annotator = Arc::clone(&self.annotator);
        let source_path = source.path().to_path_buf();
        let output_path = output.path().to_path_buf();
        let detections = tokio::task::spawn_blocking(move || {
            render_annotated(&annotator, &source_path, &output_path, detections)
        })
        .await
        .map_err(|e| PipelineError::task(PipelineStage::Inferred, e))??;
        debug!(%request_id, "stage {}", PipelineStage::Annotated);

        // Egress
        let annotated_image_url = self.storage.upload(output.path()).await?;
        debug!(%request_id, url = %annotated_image_url, "stage {}", PipelineStage::Uploaded);

        drop(output);
        drop(source);
        debug!(%request_id, "stage {}", PipelineStage::Responded);

        Ok(PredictionOutcome {
            detections,
            annotated_image_url,
        })
    }
}

/// Client filename recovered from a `temp_{filename}` path
fn source_filename(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("temp_"))
        .unwrap_or(temp_files::FALLBACK_FILENAME)
}

/// Name of the annotated copy; the extension follows the format actually written
fn annotated_filename(filename: &str, input: Option<ImageFormat>) -> String {
    match input {
        Some(format) if output_format(format) != format => {
            let stem = Path::new(filename)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(filename);
            format!("{}.{}", stem, format_to_extension(output_format(format)))
        }
        _ => filename.to_string(),
    }
}

/// Decode, draw and encode; hands the detections back unchanged
fn render_annotated(
    annotator: &Annotator,
    source: &Path,
    output: &Path,
    detections: Vec<Detection>,
) -> Result<Vec<Detection>, PipelineError> {
    let decoded = decode_image_file(source).map_err(PipelineError::Decode)?;

    if decoded.pixels.width() == 0 || decoded.pixels.height() == 0 {
        return Err(PipelineError::Annotation("decoded image has no pixels".to_string()));
    }

    let annotated = annotator.annotate(&decoded.pixels, &detections);
    encode_image_file(&annotated, output, output_format(decoded.info.format))
        .map_err(PipelineError::Encode)?;

    Ok(detections)
}
