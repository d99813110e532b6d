// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection overlay rendering
//!
//! Every detection becomes a 3px rectangle in its class color, a filled label
//! background of the same color directly above the box, and a white label.
//! Colors cycle through a fixed palette by `class_id % len`, so distinct
//! classes may share a color.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::detection::{ClassLabelTable, Detection};
use super::font::LabelFont;

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Cyclic class color palette
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<Rgb<u8>>,
}

impl ColorPalette {
    /// Falls back to the default palette when `colors` is empty
    pub fn new(colors: Vec<Rgb<u8>>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }

    pub fn color_for(&self, class_id: u32) -> Rgb<u8> {
        self.colors[class_id as usize % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            colors: vec![GREEN, RED, BLUE, YELLOW],
        }
    }
}

/// Geometry and typography of the overlays
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub box_thickness: u32,
    pub font: LabelFont,
    pub text_color: Rgb<u8>,
    pub antialiased: bool,
    /// Gap between the label background top and the text top
    pub background_padding: i32,
    /// Distance of the text baseline above the box top edge
    pub text_offset: i32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            box_thickness: 3,
            font: LabelFont::new(0.6, 2),
            text_color: WHITE,
            antialiased: true,
            background_padding: 10,
            text_offset: 5,
        }
    }
}

/// Renders detection overlays onto copies of decoded images
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    labels: ClassLabelTable,
    palette: ColorPalette,
    style: LabelStyle,
}

impl Annotator {
    pub fn new(labels: ClassLabelTable, palette: ColorPalette, style: LabelStyle) -> Self {
        Self {
            labels,
            palette,
            style,
        }
    }

    pub fn with_labels(labels: ClassLabelTable) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    pub fn labels(&self) -> &ClassLabelTable {
        &self.labels
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    pub fn label_for(&self, detection: &Detection) -> String {
        self.labels.label_for(detection)
    }

    /// Draw all detections, in order, onto a copy of `image`
    pub fn annotate(&self, image: &RgbImage, detections: &[Detection]) -> RgbImage {
        let mut canvas = image.clone();
        for detection in detections {
            self.draw_detection(&mut canvas, detection);
        }
        canvas
    }

    fn draw_detection(&self, canvas: &mut RgbImage, detection: &Detection) {
        let (x1, y1, x2, y2) = detection.bbox.to_pixel_corners();
        let color = self.palette.color_for(detection.class_id);

        draw_box(canvas, (x1, y1), (x2, y2), self.style.box_thickness, color);

        let label = self.label_for(detection);
        let size = self.style.font.text_size(&label);

        // Background spans (x1, y1 - th - pad) to (x1 + tw, y1), unclamped
        let bg_top = y1 - size.height as i32 - self.style.background_padding;
        let bg_height = (y1 - bg_top + 1) as u32;
        draw_filled_rect_mut(
            canvas,
            Rect::at(x1, bg_top).of_size(size.width + 1, bg_height),
            color,
        );

        self.style.font.draw_text(
            canvas,
            &label,
            (x1, y1 - self.style.text_offset),
            self.style.text_color,
            self.style.antialiased,
        );
    }
}

/// Rectangle outline centered on the box edges
///
/// A thickness of 3 paints one pixel outside, on, and inside each edge.
fn draw_box(
    canvas: &mut RgbImage,
    (x1, y1): (i32, i32),
    (x2, y2): (i32, i32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let (left, right) = (x1.min(x2), x1.max(x2));
    let (top, bottom) = (y1.min(y2), y1.max(y2));
    let half = (thickness.max(1) as i32 - 1) / 2;
    let extra = (thickness.max(1) as i32 - 1) - half;

    for offset in -extra..=half {
        let l = left + offset;
        let t = top + offset;
        let w = right - offset - l + 1;
        let h = bottom - offset - t + 1;
        if w <= 0 || h <= 0 {
            break;
        }
        draw_hollow_rect_mut(canvas, Rect::at(l, t).of_size(w as u32, h as u32), color);
    }
}
