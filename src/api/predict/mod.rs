// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoints
//!
//! Provides POST /predict/ for multipart uploads and POST /predict_from_url/
//! for images the caller has already stored elsewhere.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{predict_from_url_handler, predict_handler};
pub use request::PredictFromUrlRequest;
pub use response::{DetectionRecord, PredictResponse};
