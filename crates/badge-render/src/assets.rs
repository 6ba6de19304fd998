//! Render asset cache: background template image and label font.
//!
//! Replaces ambient globals with an explicit object whose per-slot load
//! state the compositor can inspect. A missing background is tolerated
//! (flat-fill fallback); a missing font fails the render.

use std::path::{Path, PathBuf};

use ab_glyph::FontRef;
use image::DynamicImage;

use crate::RenderError;

/// Relative path of the background template inside the data directory.
pub const BACKGROUND_ASSET: &str = "assets/template-background.png";

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Load state of a single asset slot.
#[derive(Debug, Clone)]
pub enum AssetState<T> {
    Pending,
    Ready(T),
    Failed,
}

impl<T> Default for AssetState<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> AssetState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// Assets required to composite a badge.
#[derive(Debug, Default)]
pub struct AssetCache {
    background: AssetState<DynamicImage>,
    font_data: AssetState<Vec<u8>>,
}

impl AssetCache {
    /// Cache with nothing loaded (both slots `Pending`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load assets from the data directory.
    ///
    /// Never fails: each slot independently ends up `Ready` or `Failed`.
    pub fn load(data_dir: &Path) -> Self {
        let background_path = data_dir.join(BACKGROUND_ASSET);
        let background = match image::open(&background_path) {
            Ok(img) => {
                tracing::info!(path = %background_path.display(), "background template loaded");
                AssetState::Ready(img)
            }
            Err(e) => {
                tracing::warn!("background template unavailable, will use flat fill: {e}");
                AssetState::Failed
            }
        };

        let font_data = match load_font_data(data_dir) {
            Some(data) => AssetState::Ready(data),
            None => {
                tracing::warn!("no usable label font found (add one under fonts/ in the data dir)");
                AssetState::Failed
            }
        };

        Self {
            background,
            font_data,
        }
    }

    pub fn with_background(mut self, img: DynamicImage) -> Self {
        self.background = AssetState::Ready(img);
        self
    }

    pub fn with_font_data(mut self, data: Vec<u8>) -> Self {
        self.font_data = AssetState::Ready(data);
        self
    }

    /// The background template, if it loaded successfully.
    pub fn background(&self) -> Option<&DynamicImage> {
        self.background.ready()
    }

    /// Parse the cached font data into a usable font.
    pub fn font(&self) -> Result<FontRef<'_>, RenderError> {
        match &self.font_data {
            AssetState::Ready(data) => FontRef::try_from_slice(data).map_err(|_| {
                RenderError::FontUnavailable("failed to parse font data (TTF/OTF)".into())
            }),
            AssetState::Pending => Err(RenderError::FontUnavailable("font not loaded yet".into())),
            AssetState::Failed => Err(RenderError::FontUnavailable(
                "no usable label font found".into(),
            )),
        }
    }
}

/// Custom font from the data directory, falling back to system fonts.
fn load_font_data(data_dir: &Path) -> Option<Vec<u8>> {
    if let Some(path) = find_custom_font(&data_dir.join("fonts")) {
        if let Ok(data) = std::fs::read(&path) {
            tracing::info!(path = %path.display(), "using custom label font");
            return Some(data);
        }
    }
    find_system_font()
}

fn find_custom_font(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if FONT_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                return Some(path);
            }
        }
    }
    None
}

/// Read the first available system font candidate.
pub fn find_system_font() -> Option<Vec<u8>> {
    for path in system_font_candidates() {
        if let Ok(data) = std::fs::read(path) {
            tracing::info!(path = %path, "using system font for badge labels");
            return Some(data);
        }
    }
    None
}

fn system_font_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
            "/System/Library/Fonts/Supplemental/Helvetica.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &[
            "C:\\Windows\\Fonts\\impact.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ]
    }
}
