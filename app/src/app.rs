//! Application shared state.

use std::path::PathBuf;
use std::sync::Arc;

use badge_render::AssetCache;
use badge_store::Database;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::events::{self, EventSender, UiEvent};

/// Shared state accessible from the CLI driver and the pipelines.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for UI events
    events: EventSender,
    /// Pipeline configuration (loaded once at startup)
    config: AppConfig,
    /// Database handle
    db: Database,
    /// Render assets (background template + label font)
    assets: AssetCache,
    /// Data directory path
    data_dir: PathBuf,
}

impl SharedState {
    /// Create shared state from an already-opened database and loaded
    /// config and assets.
    pub fn new(db: Database, config: AppConfig, assets: AssetCache, data_dir: PathBuf) -> Self {
        Self {
            inner: Arc::new(SharedStateInner {
                events: events::channel(),
                config,
                db,
                assets,
                data_dir,
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn assets(&self) -> &AssetCache {
        &self.inner.assets
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.inner.data_dir
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.inner.events.subscribe()
    }

    /// Publish an event; dropped silently when nobody listens.
    pub fn emit(&self, event: UiEvent) {
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badge_store::Database;

    #[test]
    fn data_dir_is_the_constructed_one() {
        let dir = std::env::temp_dir().join("badge-forge-state-test");
        let state = SharedState::new(
            Database::open_in_memory().unwrap(),
            AppConfig::default(),
            AssetCache::empty(),
            dir.clone(),
        );
        assert_eq!(state.data_dir(), &dir);
    }
}
