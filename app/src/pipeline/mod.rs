//! Generation pipelines: single-record and bulk.

pub mod bulk;
pub mod single;

pub use bulk::{BulkSummary, run_bulk};
pub use single::{PipelinePhase, SinglePipeline};

use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use badge_render::{QrConfig, RenderTier, compose_badge, encode_payload, to_png_bytes};
use badge_store::Artifact;

use crate::app::SharedState;

/// Pipeline error type.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Record(#[from] crate::record::RecordError),

    #[error(transparent)]
    Render(#[from] badge_render::RenderError),

    #[error(transparent)]
    Store(#[from] badge_store::StoreError),

    #[error("render timed out after {0}s")]
    Timeout(u64),

    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("no valid records found in input")]
    EmptyBatch,

    #[error("no record awaiting confirmation")]
    NoPendingRecord,
}

/// Encode a payload and composite it into a named artifact.
fn render_one(
    state: &SharedState,
    payload: &str,
    name: &str,
    tier: RenderTier,
    qr_config: QrConfig,
) -> Result<Artifact, PipelineError> {
    let code = encode_payload(payload, &qr_config)?;
    let surface = compose_badge(state.assets(), &code, name, tier)?;
    let image = to_png_bytes(&surface)?;
    debug!(name, bytes = image.len(), "badge rendered");
    Ok(Artifact::new(name, image))
}

/// Run one record's render off the async thread, bounded by the
/// configured stage timeout.
pub(crate) async fn render_with_timeout(
    state: &SharedState,
    payload: &str,
    name: &str,
    tier: RenderTier,
    qr_config: QrConfig,
) -> Result<Artifact, PipelineError> {
    let timeout_secs = state.config().render_timeout_secs;
    let task_state = state.clone();
    let payload = payload.to_string();
    let name = name.to_string();

    let task = tokio::task::spawn_blocking(move || {
        render_one(&task_state, &payload, &name, tier, qr_config)
    });

    let joined = timeout(Duration::from_secs(timeout_secs), task)
        .await
        .map_err(|_| PipelineError::Timeout(timeout_secs))?;
    Ok(joined??)
}
