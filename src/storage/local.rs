// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Directory-backed storage for development and tests
//!
//! Artifacts are copied under a UUID-prefixed name and addressed by
//! `{public_base_url}/{name}`; the HTTP server serves the directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::{ArtifactStorage, StorageError};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    directory: PathBuf,
    public_base_url: Url,
}

impl LocalStorage {
    pub fn new(directory: PathBuf, public_base_url: &str) -> Result<Self, StorageError> {
        let public_base_url = Url::parse(public_base_url).map_err(|e| {
            StorageError::Config(format!("invalid public base url '{}': {}", public_base_url, e))
        })?;
        if public_base_url.cannot_be_a_base() {
            return Err(StorageError::Config(format!(
                "public base url '{}' cannot carry a path",
                public_base_url
            )));
        }

        Ok(Self {
            directory,
            public_base_url,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Public URL for `stored_name`, percent-encoded as a single path segment
    pub fn public_url(&self, stored_name: &str) -> String {
        let mut url = self.public_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(stored_name);
        }
        url.to_string()
    }
}

#[async_trait]
impl ArtifactStorage for LocalStorage {
    async fn upload(&self, file_path: &Path) -> Result<String, StorageError> {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| StorageError::Config(format!("not a file: {}", file_path.display())))?;

        tokio::fs::create_dir_all(&self.directory).await?;

        let stored_name = format!("{}_{}", Uuid::new_v4().simple(), file_name);
        let destination = self.directory.join(&stored_name);
        tokio::fs::copy(file_path, &destination).await?;

        debug!("Stored {} at {}", file_name, destination.display());
        Ok(self.public_url(&stored_name))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
