//! Label sizing and text drawing.
//!
//! Maps label length to a discrete font-size tier and draws the label
//! centered on the badge surface, anchored at a fixed baseline.

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::NOMINAL_EDGE;

/// Base font size in pixels at the nominal surface.
pub const BASE_FONT_SIZE: f32 = 96.0;

/// Map label length to a font-size tier at nominal resolution.
///
/// Tiers step down at 10, 20, and 30 characters and never increase
/// with length.
pub fn font_tier(label_len: usize) -> f32 {
    if label_len <= 10 {
        BASE_FONT_SIZE
    } else if label_len <= 20 {
        BASE_FONT_SIZE - 16.0
    } else if label_len <= 30 {
        BASE_FONT_SIZE - 28.0
    } else {
        BASE_FONT_SIZE - 36.0
    }
}

/// Font-size multiplier for a surface with the given edge length.
///
/// Derived from the surface-to-nominal ratio rather than hardcoded;
/// a 2160px surface yields 2.4.
pub fn resolution_multiplier(edge: u32) -> f32 {
    edge as f32 / NOMINAL_EDGE as f32
}

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width(font: &FontRef<'_>, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil() as u32
}

/// Draw text centered horizontally with its baseline at `baseline_y`.
pub fn draw_centered_label(
    img: &mut RgbaImage,
    font: &FontRef<'_>,
    scale: PxScale,
    baseline_y: i32,
    text: &str,
    color: Rgba<u8>,
) {
    let ascent = font.as_scaled(scale).ascent();
    let top = baseline_y - ascent.round() as i32;
    let text_width = measure_text_width(font, scale, text) as i32;
    let x = ((img.width() as i32) - text_width).max(0) / 2;
    draw_text_mut(img, color, x, top, scale, font, text);
}
