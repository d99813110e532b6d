// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detector running on ONNX Runtime (CPU)
//!
//! Mirrors the Ultralytics predict defaults: letterbox to 640, score
//! threshold 0.25, class-aware NMS at IoU 0.7, at most 300 boxes.

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use model::YoloDetector;
pub use postprocessing::YoloParams;
