// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime session for an exported YOLO detector

use anyhow::{Context, Result};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::postprocessing::{decode_output, YoloParams};
use super::preprocessing::letterbox_tensor;
use crate::vision::detection::Detection;
use crate::vision::detector::Detector;
use crate::vision::image_utils::decode_image_file;

/// YOLO detector loaded from an ONNX export
///
/// The session is created once; `run` needs exclusive access, so calls are
/// serialised through the mutex while the weights stay read-only.
#[derive(Clone)]
pub struct YoloDetector {
    session: Arc<Mutex<Session>>,
    input_name: String,
    params: YoloParams,
    name: String,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("params", &self.params)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector from `model_path`
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime rejects it.
    pub fn load<P: AsRef<Path>>(model_path: P, params: YoloParams) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detector model not found: {}", model_path.display());
        }

        info!("Loading detector model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detector model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "yolo".to_string());

        info!("✅ Detector '{}' loaded (input: {})", name, input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            params,
            name,
        })
    }

    pub fn params(&self) -> &YoloParams {
        &self.params
    }
}

impl Detector for YoloDetector {
    fn predict(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let started = Instant::now();
        let decoded = decode_image_file(image_path)
            .with_context(|| format!("Detector could not read {}", image_path.display()))?;

        let (input, letterbox) = letterbox_tensor(&decoded.pixels, self.params.input_size);
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detector session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Detector inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract detector output")?;

        let detections = decode_output(output.view(), &letterbox, &self.params)?;

        debug!(
            "Detector produced {} detections in {}ms",
            detections.len(),
            started.elapsed().as_millis()
        );

        Ok(detections)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
