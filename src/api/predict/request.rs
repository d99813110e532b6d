// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

/// Body of POST /predict_from_url/
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictFromUrlRequest {
    /// Publicly reachable http(s) image URL
    pub url: String,
}
