//! QR payload encoding.
//!
//! Turns the exact payload string into a raster matrix image. Encoding
//! is a pure function of the payload and the configuration; a given
//! input always produces the same pixels.

use image::{DynamicImage, GrayImage, Luma};
use qrcode::{EcLevel, QrCode};

use crate::RenderError;

/// Encoder configuration: requested output size in pixels, quiet-zone
/// margin in modules, and error-correction level.
#[derive(Debug, Clone, Copy)]
pub struct QrConfig {
    pub target_size: u32,
    pub margin: u32,
    pub ec_level: EcLevel,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            target_size: 600,
            margin: 0,
            ec_level: EcLevel::H,
        }
    }
}

/// Encode a payload string into a square grayscale QR image.
///
/// Modules are drawn at the largest integer scale that keeps the image
/// within `target_size`, with a minimum of one pixel per module.
pub fn encode_payload(payload: &str, config: &QrConfig) -> Result<DynamicImage, RenderError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), config.ec_level)
        .map_err(|e| RenderError::QrEncode(e.to_string()))?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let total_modules = module_count + 2 * config.margin;

    let scale = (config.target_size / total_modules).max(1);
    let img_size = total_modules * scale;

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));

    for (i, color) in modules.iter().enumerate() {
        let x = (i as u32) % module_count + config.margin;
        let y = (i as u32) / module_count + config.margin;

        if *color == qrcode::Color::Dark {
            for dx in 0..scale {
                for dy in 0..scale {
                    img.put_pixel(x * scale + dx, y * scale + dy, Luma([0u8]));
                }
            }
        }
    }

    Ok(DynamicImage::ImageLuma8(img))
}
