// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Durable storage for annotated artifacts

pub mod cloudinary;
pub mod local;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub use cloudinary::{CloudinaryConfig, CloudinaryStorage, SignatureAlgorithm};
pub use local::LocalStorage;

use crate::config::StorageBackendConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Accepts a local file and returns a durable, publicly resolvable URL
#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    async fn upload(&self, file_path: &Path) -> Result<String, StorageError>;

    /// Backend name reported by the health endpoint
    fn backend_name(&self) -> &'static str;
}

/// Build the configured storage backend
pub fn build_storage(config: &StorageBackendConfig) -> Result<Arc<dyn ArtifactStorage>, StorageError> {
    match config {
        StorageBackendConfig::Cloudinary(cfg) => Ok(Arc::new(CloudinaryStorage::new(cfg.clone())?)),
        StorageBackendConfig::Local {
            directory,
            public_base_url,
        } => Ok(Arc::new(LocalStorage::new(directory.clone(), public_base_url)?)),
    }
}
