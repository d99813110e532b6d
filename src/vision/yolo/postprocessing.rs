// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of raw YOLO head output into detections

use anyhow::Result;
use ndarray::{ArrayView2, ArrayViewD, Ix2};
use std::cmp::Ordering;

use super::preprocessing::Letterbox;
use crate::vision::detection::{BoundingBox, Detection};

/// Thresholds applied inside the model's predict step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloParams {
    pub input_size: u32,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

/// Decode a `[1, 4 + nc, N]` (or transposed `[1, N, 4 + nc]`) output
pub fn decode_output(
    output: ArrayViewD<f32>,
    letterbox: &Letterbox,
    params: &YoloParams,
) -> Result<Vec<Detection>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detector output shape: {:?}", shape);
    }

    let view = output
        .index_axis(ndarray::Axis(0), 0)
        .into_dimensionality::<Ix2>()?;

    // Attribute-major is the export default; transposed exports put
    // candidates first and have more rows than columns.
    let view: ArrayView2<f32> = if shape[1] > shape[2] { view.reversed_axes() } else { view };

    let attributes = view.shape()[0];
    if attributes < 5 {
        anyhow::bail!("Detector output has {} attributes, expected at least 5", attributes);
    }

    let mut candidates = Vec::new();
    for i in 0..view.shape()[1] {
        let column = view.column(i);
        let (class_id, score) = column
            .iter()
            .skip(4)
            .enumerate()
            .fold((0usize, f32::MIN), |best, (idx, &s)| if s > best.1 { (idx, s) } else { best });

        if score <= params.conf_threshold {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        let bbox = BoundingBox::new(
            letterbox.unmap_x(cx - w / 2.0),
            letterbox.unmap_y(cy - h / 2.0),
            letterbox.unmap_x(cx + w / 2.0),
            letterbox.unmap_y(cy + h / 2.0),
        );

        candidates.push(Detection::new(class_id as u32, score as f64, bbox));
    }

    Ok(non_max_suppression(candidates, params.iou_threshold, params.max_detections))
}

/// Class-aware NMS; result is sorted by descending confidence
pub fn non_max_suppression(
    mut candidates: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.bbox.iou(&candidate.bbox) > iou_threshold as f64
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
