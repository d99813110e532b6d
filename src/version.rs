// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the billboard ML service

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Service name used in logs
pub const SERVICE_NAME: &str = "Billboard ML Service";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "predict-from-url",
    "yolo-onnx",
    "annotated-overlays",
    "cloudinary-storage",
    "local-storage",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} {}", SERVICE_NAME, VERSION_NUMBER)
}
