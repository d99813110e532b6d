// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Built-in 5x7 bitmap font used for detection labels
//!
//! Glyphs are scaled by an integer dot size derived from the font scale, and
//! the stroke width thickens every dot. Lowercase letters render with the
//! uppercase glyph; characters without a glyph render as `?`.

use image::{Rgb, RgbImage};

const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_COLS + 1;

/// Coverage used for the soft edge around anti-aliased strokes
const FRINGE_COVERAGE: u8 = 96;

/// Rendered text extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSize {
    pub width: u32,
    pub height: u32,
    /// Space below the baseline reserved for descenders
    pub baseline: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelFont {
    scale: f32,
    thickness: u32,
}

impl LabelFont {
    pub fn new(scale: f32, thickness: u32) -> Self {
        Self {
            scale: scale.max(0.1),
            thickness: thickness.max(1),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    /// Pixels per glyph bit
    pub fn dot(&self) -> u32 {
        ((self.scale * 10.0 / 3.0).round() as u32).max(1)
    }

    fn stroke(&self) -> u32 {
        self.dot() + self.thickness - 1
    }

    pub fn text_size(&self, text: &str) -> TextSize {
        let dot = self.dot();
        let chars = text.chars().count() as u32;
        let width = if chars == 0 {
            0
        } else {
            chars * GLYPH_ADVANCE * dot - dot + (self.thickness - 1)
        };

        TextSize {
            width,
            height: GLYPH_ROWS * dot + (self.thickness - 1),
            baseline: 2 * dot,
        }
    }

    /// Draw `text` with its bottom-left corner at `origin`
    ///
    /// Pixels outside the canvas are skipped.
    pub fn draw_text(
        &self,
        image: &mut RgbImage,
        text: &str,
        origin: (i32, i32),
        color: Rgb<u8>,
        antialiased: bool,
    ) {
        let size = self.text_size(text);
        if size.width == 0 {
            return;
        }

        // Mask with a one pixel margin for the fringe
        let mask_w = size.width + 2;
        let mask_h = size.height + 2;
        let mut mask = vec![0u8; (mask_w * mask_h) as usize];

        let dot = self.dot();
        let stroke = self.stroke();
        for (index, ch) in text.chars().enumerate() {
            let rows = glyph(ch);
            let glyph_x = index as u32 * GLYPH_ADVANCE * dot;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if (bits >> (GLYPH_COLS - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let left = 1 + glyph_x + col * dot;
                    let top = 1 + row as u32 * dot;
                    for dy in 0..stroke {
                        for dx in 0..stroke {
                            let (mx, my) = (left + dx, top + dy);
                            if mx < mask_w && my < mask_h {
                                mask[(my * mask_w + mx) as usize] = u8::MAX;
                            }
                        }
                    }
                }
            }
        }

        if antialiased {
            let solid = mask.clone();
            for my in 0..mask_h {
                for mx in 0..mask_w {
                    let idx = (my * mask_w + mx) as usize;
                    if solid[idx] == u8::MAX {
                        continue;
                    }
                    let touches = (mx > 0 && solid[idx - 1] == u8::MAX)
                        || (mx + 1 < mask_w && solid[idx + 1] == u8::MAX)
                        || (my > 0 && solid[idx - mask_w as usize] == u8::MAX)
                        || (my + 1 < mask_h && solid[idx + mask_w as usize] == u8::MAX);
                    if touches {
                        mask[idx] = FRINGE_COVERAGE;
                    }
                }
            }
        }

        let left = origin.0 - 1;
        let top = origin.1 - size.height as i32 - 1;
        let (img_w, img_h) = (image.width() as i32, image.height() as i32);

        for my in 0..mask_h {
            for mx in 0..mask_w {
                let coverage = mask[(my * mask_w + mx) as usize];
                if coverage == 0 {
                    continue;
                }
                let x = left + mx as i32;
                let y = top + my as i32;
                if x < 0 || y < 0 || x >= img_w || y >= img_h {
                    continue;
                }
                let pixel = image.get_pixel_mut(x as u32, y as u32);
                *pixel = blend(*pixel, color, coverage);
            }
        }
    }
}

fn blend(base: Rgb<u8>, color: Rgb<u8>, coverage: u8) -> Rgb<u8> {
    if coverage == u8::MAX {
        return color;
    }
    let a = coverage as u32;
    let mix = |b: u8, c: u8| ((b as u32 * (255 - a) + c as u32 * a + 127) / 255) as u8;
    Rgb([
        mix(base[0], color[0]),
        mix(base[1], color[1]),
        mix(base[2], color[2]),
    ])
}

fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
        ',' => [0, 0, 0, 0, 0b01100, 0b00100, 0b01000],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        '_' => [0, 0, 0, 0, 0, 0, 0b11111],
        '/' => [0, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        ' ' => [0; 7],
        _ => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0, 0b00100],
    }
}
