// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP surface of the prediction service

pub mod errors;
pub mod health;
pub mod http_server;
pub mod predict;

pub use errors::ErrorResponse;
pub use health::HealthResponse;
pub use http_server::{create_app, start_server, AppState};
pub use predict::{DetectionRecord, PredictFromUrlRequest, PredictResponse};
