// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures: in-memory detectors, storage backends and image payloads

#![allow(dead_code)]

use async_trait::async_trait;
use billboard_ml_service::pipeline::PredictionPipeline;
use billboard_ml_service::storage::{ArtifactStorage, StorageError};
use billboard_ml_service::vision::{Annotator, ClassLabelTable, Detection, Detector};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "billboard-test-boundary";

/// Detector returning a fixed list and remembering the paths it was given
pub struct FixedDetector {
    detections: Vec<Detection>,
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl FixedDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Paths passed to `predict`, with whether the file existed at that time
    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Detector for FixedDetector {
    fn predict(&self, image_path: &Path) -> anyhow::Result<Vec<Detection>> {
        self.seen
            .lock()
            .unwrap()
            .push((image_path.to_path_buf(), image_path.exists()));
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

pub struct FailingDetector;

impl Detector for FailingDetector {
    fn predict(&self, _image_path: &Path) -> anyhow::Result<Vec<Detection>> {
        anyhow::bail!("malformed input tensor")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// One artifact captured by `RecordingStorage`
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Storage that keeps a copy of every uploaded file in memory
#[derive(Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<StoredArtifact>>,
}

impl RecordingStorage {
    pub fn uploads(&self) -> Vec<StoredArtifact> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStorage for RecordingStorage {
    async fn upload(&self, file_path: &Path) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(file_path).await?;
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.uploads.lock().unwrap().push(StoredArtifact {
            path: file_path.to_path_buf(),
            bytes,
        });
        Ok(format!("https://storage.test/{}", name))
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

pub struct FailingStorage;

#[async_trait]
impl ArtifactStorage for FailingStorage {
    async fn upload(&self, _file_path: &Path) -> Result<String, StorageError> {
        Err(StorageError::NetworkError("connection refused".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

pub fn pipeline(
    detector: Arc<dyn Detector>,
    storage: Arc<dyn ArtifactStorage>,
    work_dir: &Path,
) -> PredictionPipeline {
    PredictionPipeline::new(
        detector,
        Annotator::with_labels(ClassLabelTable::default()),
        storage,
        work_dir.to_path_buf(),
    )
}

pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

pub fn decode_png(bytes: &[u8]) -> RgbImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .unwrap()
        .to_rgb8()
}

/// Multipart body with one file field
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Multipart body with only a plain text field
pub fn multipart_text_only(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"\r\n\r\n{v}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = field,
        v = value
    )
    .into_bytes()
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Files left in `dir`
pub fn remaining_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

/// Serve `router` on an ephemeral loopback port and return its base URL
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
