//! Badge rendering: QR payload encoding, label sizing, and composition
//! of background, code, and label onto a fixed-geometry raster surface.

pub mod assets;
pub mod compose;
pub mod label;
pub mod qr;

pub use assets::{AssetCache, AssetState};
pub use compose::{RenderTier, compose_badge, to_png_bytes};
pub use qr::{QrConfig, encode_payload};
pub use qrcode::EcLevel;

/// Edge length of the reference surface all geometry constants are
/// expressed against.
pub const REFERENCE_EDGE: u32 = 2160;

/// Edge length of the nominal surface the font-size tiers are
/// calibrated to.
pub const NOMINAL_EDGE: u32 = 900;

/// Rendering error type.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("QR encode error: {0}")]
    QrEncode(String),

    #[error("label font unavailable: {0}")]
    FontUnavailable(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),
}
