// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::{Deserialize, Serialize};

use crate::pipeline::PredictionOutcome;
use crate::vision::Detection;

/// One detection as reported to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionRecord {
    /// Integer class id
    #[serde(rename = "class")]
    pub class_id: u32,
    pub confidence: f64,
    /// `[x1, y1, x2, y2]` in original image pixels
    pub xyxy: [f64; 4],
}

impl From<&Detection> for DetectionRecord {
    fn from(detection: &Detection) -> Self {
        Self {
            class_id: detection.class_id,
            confidence: detection.confidence,
            xyxy: detection.bbox.as_xyxy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub detections: Vec<DetectionRecord>,
    pub annotated_image_url: String,
}

impl From<PredictionOutcome> for PredictResponse {
    fn from(outcome: PredictionOutcome) -> Self {
        Self {
            detections: outcome.detections.iter().map(DetectionRecord::from).collect(),
            annotated_image_url: outcome.annotated_image_url,
        }
    }
}
