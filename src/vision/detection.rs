// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection records and the class label table

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis-aligned box in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }

    /// Corners truncated toward zero, matching an integer cast of each coordinate
    pub fn to_pixel_corners(&self) -> (i32, i32, i32, i32) {
        (
            self.x1 as i32,
            self.y1 as i32,
            self.x2 as i32,
            self.y2 as i32,
        )
    }

    pub fn as_xyxy(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// One object found by the detector
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    /// Model confidence (0.0-1.0)
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_id: u32, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LabelTableError {
    #[error("Invalid class label entry '{0}', expected <id>:<name>")]
    InvalidEntry(String),

    #[error("Invalid class id '{0}'")]
    InvalidClassId(String),

    #[error("Empty class name for id {0}")]
    EmptyName(u32),
}

/// Mapping from detector class id to a human-readable name
///
/// Ids without an entry render as `Class {id}` so newer detector classes
/// still get a label.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLabelTable {
    names: BTreeMap<u32, String>,
}

impl ClassLabelTable {
    pub fn new(names: BTreeMap<u32, String>) -> Self {
        Self { names }
    }

    pub fn empty() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    pub fn name(&self, class_id: u32) -> String {
        match self.names.get(&class_id) {
            Some(name) => name.clone(),
            None => format!("Class {}", class_id),
        }
    }

    /// Label drawn next to a box: name plus confidence to two decimals
    pub fn label_for(&self, detection: &Detection) -> String {
        format!("{} {:.2}", self.name(detection.class_id), detection.confidence)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ClassLabelTable {
    fn default() -> Self {
        let mut names = BTreeMap::new();
        names.insert(0, "Billboard".to_string());
        names.insert(1, "Stand".to_string());
        Self { names }
    }
}

/// Parses `0:Billboard,1:Stand`
impl FromStr for ClassLabelTable {
    type Err = LabelTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut names = BTreeMap::new();

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (id, name) = entry
                .split_once(':')
                .ok_or_else(|| LabelTableError::InvalidEntry(entry.to_string()))?;

            let id = id
                .trim()
                .parse::<u32>()
                .map_err(|_| LabelTableError::InvalidClassId(id.trim().to_string()))?;

            let name = name.trim();
            if name.is_empty() {
                return Err(LabelTableError::EmptyName(id));
            }

            names.insert(id, name.to_string());
        }

        Ok(Self { names })
    }
}
