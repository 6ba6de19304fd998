//! Badge composition: background, QR code, and label merged onto one
//! surface at fixed geometry.
//!
//! All offsets are expressed against the 2160px reference edge and
//! scaled proportionally to the tier's actual edge length.

use std::io::Cursor;

use ab_glyph::PxScale;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::assets::AssetCache;
use crate::label::{draw_centered_label, font_tier, resolution_multiplier};
use crate::{NOMINAL_EDGE, REFERENCE_EDGE, RenderError};

// Geometry at the reference edge.
const QR_SIZE: u32 = 1300;
const QR_TOP: u32 = 360;
const LABEL_BASELINE: u32 = 1950;

/// Label fill color (#e59e02).
const LABEL_COLOR: Rgba<u8> = Rgba([0xe5, 0x9e, 0x02, 0xff]);
/// Flat fill used when the background template is unavailable (#f3ede2).
const FALLBACK_FILL: Rgba<u8> = Rgba([0xf3, 0xed, 0xe2, 0xff]);

/// Output resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTier {
    /// Single-badge surface.
    Nominal,
    /// High-resolution surface used for bulk runs.
    High,
}

impl RenderTier {
    /// Edge length of the square surface for this tier.
    pub fn edge(self) -> u32 {
        match self {
            Self::Nominal => NOMINAL_EDGE,
            Self::High => REFERENCE_EDGE,
        }
    }
}

/// Composite background, QR image, and label onto one badge surface.
///
/// A missing or failed background template falls back to a flat fill;
/// a missing font is an error. The result carries no persistence side
/// effects.
pub fn compose_badge(
    assets: &AssetCache,
    qr: &DynamicImage,
    label: &str,
    tier: RenderTier,
) -> Result<RgbaImage, RenderError> {
    let font = assets.font()?;
    let edge = tier.edge();
    let scale = |v: u32| -> u32 { (u64::from(v) * u64::from(edge) / u64::from(REFERENCE_EDGE)) as u32 };

    let mut surface = match assets.background() {
        Some(bg) => bg.resize_exact(edge, edge, FilterType::Lanczos3).to_rgba8(),
        None => {
            debug!("background template unavailable, using flat fill");
            RgbaImage::from_pixel(edge, edge, FALLBACK_FILL)
        }
    };

    let qr_size = scale(QR_SIZE);
    let qr_scaled = qr.resize_exact(qr_size, qr_size, FilterType::Lanczos3);
    let qr_x = (edge - qr_size) / 2;
    overlay(&mut surface, &qr_scaled, qr_x, scale(QR_TOP));

    let size = font_tier(label.chars().count()) * resolution_multiplier(edge);
    draw_centered_label(
        &mut surface,
        &font,
        PxScale::from(size),
        scale(LABEL_BASELINE) as i32,
        &label.to_uppercase(),
        LABEL_COLOR,
    );

    Ok(surface)
}

/// Serialize a composed surface to PNG bytes.
pub fn to_png_bytes(surface: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    surface
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Alpha-composite `top` onto `base` at the given position.
fn overlay(base: &mut RgbaImage, top: &DynamicImage, x: u32, y: u32) {
    let top_rgba = top.to_rgba8();
    for (dx, dy, pixel) in top_rgba.enumerate_pixels() {
        let target_x = x + dx;
        let target_y = y + dy;
        if target_x < base.width() && target_y < base.height() {
            let alpha = pixel[3] as f32 / 255.0;
            if alpha > 0.99 {
                base.put_pixel(target_x, target_y, *pixel);
            } else if alpha > 0.01 {
                let bg = base.get_pixel(target_x, target_y);
                base.put_pixel(target_x, target_y, blend_pixel(bg, pixel, alpha));
            }
        }
    }
}

fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let inv = 1.0 - alpha;
    Rgba([
        (fg[0] as f32 * alpha + bg[0] as f32 * inv) as u8,
        (fg[1] as f32 * alpha + bg[1] as f32 * inv) as u8,
        (fg[2] as f32 * alpha + bg[2] as f32 * inv) as u8,
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::find_system_font;
    use crate::qr::{QrConfig, encode_payload};

    fn font_cache() -> Option<AssetCache> {
        find_system_font().map(|data| AssetCache::empty().with_font_data(data))
    }

    #[test]
    fn compose_without_font_fails() {
        let qr = encode_payload("1|Alice", &QrConfig::default()).unwrap();
        let err = compose_badge(&AssetCache::empty(), &qr, "Alice", RenderTier::Nominal);
        assert!(matches!(err, Err(RenderError::FontUnavailable(_))));
    }

    #[test]
    fn compose_nominal_uses_fallback_fill() {
        let Some(cache) = font_cache() else { return };
        let qr = encode_payload("1|Alice", &QrConfig::default()).unwrap();
        let surface = compose_badge(&cache, &qr, "Alice", RenderTier::Nominal).unwrap();
        assert_eq!(surface.width(), 900);
        assert_eq!(surface.height(), 900);
        // No background template loaded, so corners carry the flat fill.
        assert_eq!(surface.get_pixel(0, 0), &FALLBACK_FILL);
    }

    #[test]
    fn compose_high_tier_is_reference_sized() {
        let Some(cache) = font_cache() else { return };
        let qr = encode_payload("2|Bob", &QrConfig::default()).unwrap();
        let surface = compose_badge(&cache, &qr, "Bob", RenderTier::High).unwrap();
        assert_eq!(surface.width(), 2160);
        assert_eq!(surface.height(), 2160);
    }

    #[test]
    fn compose_draws_background_full_bleed() {
        let Some(font) = find_system_font() else {
            return;
        };
        let bg = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            10,
            10,
            Rgba([10, 20, 30, 255]),
        ));
        let cache = AssetCache::empty().with_background(bg).with_font_data(font);
        let qr = encode_payload("3|Eve", &QrConfig::default()).unwrap();
        let surface = compose_badge(&cache, &qr, "Eve", RenderTier::Nominal).unwrap();
        assert_eq!(surface.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn png_bytes_start_with_signature() {
        let surface = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let bytes = to_png_bytes(&surface).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }
}
