// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for the prediction pipeline
//!
//! This module provides:
//! - Detection records and the class label table
//! - The `Detector` capability and its YOLO/ONNX implementation
//! - Overlay rendering for annotated output

pub mod annotation;
pub mod detection;
pub mod detector;
pub mod font;
pub mod image_utils;
pub mod yolo;

pub use annotation::{Annotator, ColorPalette, LabelStyle};
pub use detection::{BoundingBox, ClassLabelTable, Detection};
pub use detector::Detector;
pub use image_utils::{decode_image_bytes, decode_image_file, detect_format, DecodedImage, ImageError, ImageInfo};
pub use yolo::{YoloDetector, YoloParams};
