// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector capability consumed by the prediction pipeline

use anyhow::Result;
use std::path::Path;

use super::detection::Detection;

/// A pretrained object detector
///
/// Implementations are loaded once at start-up and shared read-only across
/// requests. `predict` is blocking and is called from the blocking pool.
pub trait Detector: Send + Sync {
    /// Run the model once over the image at `image_path`
    ///
    /// Returns every detection the model produces, in model order. An empty
    /// list is a valid result.
    fn predict(&self, image_path: &Path) -> Result<Vec<Detection>>;

    /// Short name reported by the health endpoint
    fn name(&self) -> &str;
}
