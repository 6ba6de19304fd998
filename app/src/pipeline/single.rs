//! Single-record pipeline with a user confirmation checkpoint.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use badge_render::{QrConfig, RenderTier};
use badge_store::Artifact;

use super::{PipelineError, render_with_timeout};
use crate::app::SharedState;
use crate::events::UiEvent;
use crate::record::Record;

/// Where the pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    #[default]
    Idle,
    AwaitingConfirmation,
    Rendering,
    Done,
    Failed,
}

/// Orchestrates parse, confirm, encode, composite, and history append
/// for exactly one record.
pub struct SinglePipeline {
    state: SharedState,
    phase: PipelinePhase,
    pending: Option<Record>,
}

impl SinglePipeline {
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            phase: PipelinePhase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Validate the two fields and park the record for confirmation.
    ///
    /// Validation failure is blocking: an alert is raised and the
    /// pipeline stays idle.
    pub fn submit(&mut self, identifier: &str, label: &str) -> Result<&Record, PipelineError> {
        let record = match Record::new(identifier, label) {
            Ok(r) => r,
            Err(e) => {
                self.state.emit(UiEvent::Alert {
                    message: "Please enter both an ID and a Name.".into(),
                });
                return Err(e.into());
            }
        };
        self.phase = PipelinePhase::AwaitingConfirmation;
        Ok(&*self.pending.insert(record))
    }

    /// Discard the pending record and return to idle.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.phase = PipelinePhase::Idle;
    }

    /// Render the confirmed record and append it to history.
    pub async fn confirm(&mut self) -> Result<Artifact, PipelineError> {
        let record = self.pending.take().ok_or(PipelineError::NoPendingRecord)?;
        self.phase = PipelinePhase::Rendering;

        match self.render(&record).await {
            Ok(artifact) => {
                self.phase = PipelinePhase::Done;
                Ok(artifact)
            }
            Err(e) => {
                self.phase = PipelinePhase::Failed;
                warn!("single badge generation failed: {e}");
                self.state.emit(UiEvent::Toast {
                    message: "Badge generation failed. Please try again.".into(),
                });
                Err(e)
            }
        }
    }

    async fn render(&self, record: &Record) -> Result<Artifact, PipelineError> {
        let config = self.state.config();

        // Deliberate pause so the UI's processing state is perceptible.
        sleep(Duration::from_millis(config.processing_delay_ms)).await;

        let payload = record.payload(config.separator);
        let artifact = render_with_timeout(
            &self.state,
            &payload,
            &record.label,
            RenderTier::Nominal,
            QrConfig::default(),
        )
        .await?;

        let inserted = self.state.db().append_history(&artifact)?;
        if !inserted {
            info!(name = %artifact.name, "name already in history, append skipped");
        }

        self.state.emit(UiEvent::RenderComplete {
            name: artifact.name.clone(),
            image: artifact.image.clone(),
        });
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badge_render::AssetCache;
    use badge_render::assets::find_system_font;
    use badge_store::Database;

    use crate::config::AppConfig;

    fn test_state(assets: AssetCache) -> SharedState {
        let db = Database::open_in_memory().unwrap();
        let config = AppConfig {
            processing_delay_ms: 0,
            bulk_record_delay_ms: 0,
            bulk_skip_delay_ms: 0,
            ..AppConfig::default()
        };
        SharedState::new(db, config, assets, std::env::temp_dir())
    }

    #[test]
    fn submit_rejects_empty_fields() {
        let state = test_state(AssetCache::empty());
        let mut rx = state.subscribe();
        let mut pipeline = SinglePipeline::new(state);

        assert!(pipeline.submit("", "Alice").is_err());
        assert_eq!(pipeline.phase(), PipelinePhase::Idle);
        assert!(matches!(rx.try_recv(), Ok(UiEvent::Alert { .. })));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let state = test_state(AssetCache::empty());
        let mut pipeline = SinglePipeline::new(state);

        pipeline.submit("1", "Alice").unwrap();
        assert_eq!(pipeline.phase(), PipelinePhase::AwaitingConfirmation);

        pipeline.cancel();
        assert_eq!(pipeline.phase(), PipelinePhase::Idle);
    }

    #[tokio::test]
    async fn confirm_without_pending_record_fails() {
        let state = test_state(AssetCache::empty());
        let mut pipeline = SinglePipeline::new(state);
        assert!(matches!(
            pipeline.confirm().await,
            Err(PipelineError::NoPendingRecord)
        ));
    }

    #[tokio::test]
    async fn render_failure_leaves_history_untouched() {
        // Empty asset cache: no font, so the render must fail.
        let state = test_state(AssetCache::empty());
        let mut pipeline = SinglePipeline::new(state.clone());

        pipeline.submit("1", "Alice").unwrap();
        assert!(pipeline.confirm().await.is_err());
        assert_eq!(pipeline.phase(), PipelinePhase::Failed);
        assert!(state.db().history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn confirm_renders_and_appends_to_history() {
        let Some(font) = find_system_font() else {
            return;
        };
        let state = test_state(AssetCache::empty().with_font_data(font));
        let mut rx = state.subscribe();
        let mut pipeline = SinglePipeline::new(state.clone());

        pipeline.submit("1", "Alice").unwrap();
        let artifact = pipeline.confirm().await.unwrap();
        assert_eq!(pipeline.phase(), PipelinePhase::Done);
        assert_eq!(artifact.name, "Alice");

        // The completion event delivers the final PNG, not just the name.
        match rx.try_recv() {
            Ok(UiEvent::RenderComplete { name, image }) => {
                assert_eq!(name, "Alice");
                assert_eq!(image, artifact.image);
            }
            other => panic!("expected a render-complete event, got {other:?}"),
        }

        let history = state.db().history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "Alice");

        // Same name again is a silent no-op.
        let mut again = SinglePipeline::new(state.clone());
        again.submit("2", "alice").unwrap();
        again.confirm().await.unwrap();
        assert_eq!(state.db().history().unwrap().len(), 1);
    }
}
