// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cloudinary signed upload client

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{ArtifactStorage, StorageError};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(StorageError::Config(format!(
                "unsupported signature algorithm '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
    pub api_base_url: String,
    pub signature_algorithm: SignatureAlgorithm,
    pub timeout_seconds: u64,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            folder: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            signature_algorithm: SignatureAlgorithm::default(),
            timeout_seconds: 60,
        }
    }

    /// Parse `cloudinary://<api_key>:<api_secret>@<cloud_name>`
    pub fn from_url(raw: &str) -> Result<Self, StorageError> {
        let parsed = Url::parse(raw)
            .map_err(|e| StorageError::Config(format!("invalid CLOUDINARY_URL: {}", e)))?;

        if parsed.scheme() != "cloudinary" {
            return Err(StorageError::Config(format!(
                "CLOUDINARY_URL must use the cloudinary:// scheme, got {}",
                parsed.scheme()
            )));
        }

        let cloud_name = parsed.host_str().unwrap_or_default();
        let api_key = parsed.username();
        let api_secret = parsed.password().unwrap_or_default();

        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            return Err(StorageError::Config(
                "CLOUDINARY_URL must include api key, api secret and cloud name".to_string(),
            ));
        }

        Ok(Self::new(cloud_name, api_key, api_secret))
    }

    pub fn upload_endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct CloudinaryStorage {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    /// Signature over the sorted signed parameters followed by the secret
    pub fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let payload = format!("{}{}", to_sign, self.config.api_secret);

        match self.config.signature_algorithm {
            SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
            SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
        }
    }
}

#[async_trait]
impl ArtifactStorage for CloudinaryStorage {
    async fn upload(&self, file_path: &Path) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let folder = self.config.folder.clone().unwrap_or_default();
        let signature = self.sign(&[("timestamp", &timestamp), ("folder", &folder)]);

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.clone()))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);
        if !folder.is_empty() {
            form = form.text("folder", folder);
        }
        if self.config.signature_algorithm == SignatureAlgorithm::Sha256 {
            form = form.text("signature_algorithm", "sha256");
        }

        let endpoint = self.config.upload_endpoint();
        debug!("Uploading {} to {}", file_name, endpoint);

        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Cloudinary rejected upload ({}): {}", status, message);
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        let url = parsed.secure_url.or(parsed.url).ok_or_else(|| {
            StorageError::InvalidResponse("upload response has no secure_url".to_string())
        })?;

        info!("Uploaded {} to {}", file_name, url);
        Ok(url)
    }

    fn backend_name(&self) -> &'static str {
        "cloudinary"
    }
}
