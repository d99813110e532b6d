// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload payloads entering the pipeline

use tracing::debug;
use url::Url;

use super::errors::PipelineError;
use super::temp_files::{sanitize_filename, FALLBACK_FILENAME};

/// One uploaded image: the client filename and the raw bytes
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Filename for a remote image: the last non-empty path segment
pub fn filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(sanitize_filename)
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Download an image so it can enter the pipeline like an upload
pub async fn fetch_remote_image(
    client: &reqwest::Client,
    raw_url: &str,
) -> Result<UploadedImage, PipelineError> {
    let url = Url::parse(raw_url)
        .map_err(|e| PipelineError::Fetch(format!("invalid url '{}': {}", raw_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(PipelineError::Fetch(format!(
            "unsupported url scheme '{}'",
            url.scheme()
        )));
    }

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| PipelineError::Fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::Fetch(format!(
            "{} returned status {}",
            url, status
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PipelineError::Fetch(e.to_string()))?;

    debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(UploadedImage::new(filename_from_url(&url), bytes.to_vec()))
}
