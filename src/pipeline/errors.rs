// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use super::PipelineStage;
use crate::storage::StorageError;
use crate::vision::ImageError;

/// Failure of any pipeline stage
///
/// All variants surface identically at the HTTP boundary; the variant only
/// records where the request failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to receive upload: {0}")]
    Ingress(String),

    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] ImageError),

    #[error("Inference failed: {0:#}")]
    Inference(#[source] anyhow::Error),

    #[error("Annotation failed: {0}")]
    Annotation(String),

    #[error("Failed to write annotated image: {0}")]
    Encode(#[source] ImageError),

    #[error("Upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("Worker task failed: {message}")]
    Task {
        /// Stage the worker was started from
        stage: PipelineStage,
        message: String,
    },
}

impl PipelineError {
    /// Last stage the request was in when it failed
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Ingress(_) | PipelineError::Fetch(_) => PipelineStage::Received,
            PipelineError::Inference(_) => PipelineStage::Saved,
            PipelineError::Decode(_) | PipelineError::Annotation(_) => PipelineStage::Inferred,
            PipelineError::Encode(_) | PipelineError::Upload(_) => PipelineStage::Annotated,
            PipelineError::Task { stage, .. } => *stage,
        }
    }

    /// A blocking worker started at `stage` panicked or was cancelled
    pub fn task(stage: PipelineStage, e: tokio::task::JoinError) -> Self {
        PipelineError::Task {
            stage,
            message: e.to_string(),
        }
    }
}
