// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLO input tensors

use image::{imageops::FilterType, Rgb, RgbImage};
use ndarray::Array4;

/// Padding color used by Ultralytics letterboxing
pub const LETTERBOX_FILL: u8 = 114;

/// Mapping between letterboxed model space and source pixels
///
/// Pads are whole pixels so the tensor placement and the inverse mapping
/// use the same offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    pub fn new(source_width: u32, source_height: u32, target_size: u32) -> Self {
        let scale = (target_size as f32 / source_width.max(1) as f32)
            .min(target_size as f32 / source_height.max(1) as f32);
        let new_w = (source_width as f32 * scale).round();
        let new_h = (source_height as f32 * scale).round();

        Self {
            scale,
            pad_x: edge_pad(target_size as f32 - new_w),
            pad_y: edge_pad(target_size as f32 - new_h),
            source_width,
            source_height,
        }
    }

    /// Map an x coordinate from model space back to source pixels, clamped
    pub fn unmap_x(&self, x: f32) -> f64 {
        (((x - self.pad_x) / self.scale) as f64).clamp(0.0, self.source_width as f64)
    }

    pub fn unmap_y(&self, y: f32) -> f64 {
        (((y - self.pad_y) / self.scale) as f64).clamp(0.0, self.source_height as f64)
    }
}

/// Leading pad for `slack` spare pixels; odd slack puts the extra pixel last
fn edge_pad(slack: f32) -> f32 {
    (slack / 2.0 - 0.1).round().max(0.0)
}

/// Resize with aspect ratio preserved, pad to a square, and convert to a
/// normalised NCHW tensor `[1, 3, size, size]`
pub fn letterbox_tensor(image: &RgbImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let letterbox = Letterbox::new(image.width(), image.height(), target_size);
    let size = target_size as usize;
    let mut tensor = Array4::from_elem((1, 3, size, size), LETTERBOX_FILL as f32 / 255.0);

    if image.width() == 0 || image.height() == 0 {
        return (tensor, letterbox);
    }

    let new_w = ((image.width() as f32 * letterbox.scale).round() as u32).clamp(1, target_size);
    let new_h = ((image.height() as f32 * letterbox.scale).round() as u32).clamp(1, target_size);
    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let offset_x = letterbox.pad_x as usize;
    let offset_y = letterbox.pad_y as usize;

    for (x, y, Rgb(px)) in resized.enumerate_pixels() {
        let tx = x as usize + offset_x;
        let ty = y as usize + offset_y;
        if tx >= size || ty >= size {
            continue;
        }
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = px[c] as f32 / 255.0;
        }
    }

    (tensor, letterbox)
}
