//! Badge Forge: turns `identifier|label` records into QR badge images,
//! individually or in bulk, with persisted history and archive export.

pub mod app;
pub mod config;
pub mod events;
pub mod export;
pub mod pipeline;
pub mod record;

use std::path::PathBuf;

use badge_render::AssetCache;
use badge_store::Database;

use config::AppConfig;

/// Determine the data directory for the application.
/// Priority: BADGE_FORGE_DATA_DIR env var > ~/.badge-forge
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BADGE_FORGE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".badge-forge")
}

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}

/// Initialize database, config, and render assets.
pub fn init_foundation() -> Result<(Database, AppConfig, AssetCache, PathBuf), anyhow::Error> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("local.db");

    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let config = AppConfig::from_env();
    let assets = AssetCache::load(&dir);

    Ok((db, config, assets, dir))
}
