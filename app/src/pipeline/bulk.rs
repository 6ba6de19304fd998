//! Bulk pipeline: sequential, throttled generation over many lines.
//!
//! Records render one at a time with a short pause between them; the
//! throttle is deliberate, keeping at most one encode/composite in
//! flight during a batch run.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use badge_render::{EcLevel, QrConfig, RenderTier};

use super::{PipelineError, render_with_timeout};
use crate::app::SharedState;
use crate::events::UiEvent;
use crate::record::Record;

/// Outcome of a bulk run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub message: String,
}

/// Generate badges for every parseable line of `input`.
///
/// Malformed lines are skipped and counted; the whole batch is rejected
/// upfront only when no line parses at all, before any rendering
/// starts. On completion the batch store is replaced wholesale.
pub async fn run_bulk(state: &SharedState, input: &str) -> Result<BulkSummary, PipelineError> {
    let config = state.config();
    let separator = config.separator;

    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let parseable = lines
        .iter()
        .filter(|l| Record::parse_line(l, separator).is_ok())
        .count();
    if parseable == 0 {
        state.emit(UiEvent::Alert {
            message: format!(
                "No valid ID{separator}Name data found in the input. Please check the format."
            ),
        });
        return Err(PipelineError::EmptyBatch);
    }

    let qr_config = QrConfig {
        ec_level: EcLevel::M,
        ..QrConfig::default()
    };

    let mut artifacts = Vec::new();
    let mut failed = 0usize;

    for line in &lines {
        let record = match Record::parse_line(line, separator) {
            Ok(r) => r,
            Err(e) => {
                warn!(line, "skipping malformed line: {e}");
                failed += 1;
                sleep(Duration::from_millis(config.bulk_skip_delay_ms)).await;
                continue;
            }
        };

        // Bulk mode embeds the full raw line as the payload.
        match render_with_timeout(state, line, &record.label, RenderTier::High, qr_config).await {
            Ok(artifact) => {
                state.emit(UiEvent::RenderComplete {
                    name: artifact.name.clone(),
                    image: artifact.image.clone(),
                });
                artifacts.push(artifact);
            }
            Err(e) => {
                warn!(line, "record failed to render: {e}");
                failed += 1;
            }
        }

        sleep(Duration::from_millis(config.bulk_record_delay_ms)).await;
    }

    let succeeded = artifacts.len();
    state.db().replace_batch(&artifacts)?;

    let mut message = format!("{succeeded} QR badges complete!");
    if failed > 0 {
        message.push_str(&format!(" ({failed} lines failed due to incorrect format.)"));
    }
    info!(succeeded, failed, "bulk run finished");
    state.emit(UiEvent::RunSummary {
        succeeded,
        failed,
        message: message.clone(),
    });

    Ok(BulkSummary {
        succeeded,
        failed,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use badge_render::AssetCache;
    use badge_render::assets::find_system_font;
    use badge_store::{Artifact, Database};

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

    #[tokio::test]
    async fn partial_failure_is_tolerated() {
        let Some(font) = find_system_font() else {
            return;
        };
        let state = test_state(AssetCache::empty().with_font_data(font));
        let mut rx = state.subscribe();

        let summary = run_bulk(&state, "1|Alice\nbad-line\n2|Bob\n").await.unwrap();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        match rx.try_recv() {
            Ok(UiEvent::RenderComplete { name, image }) => {
                assert_eq!(name, "Alice");
                assert!(!image.is_empty());
            }
            other => panic!("expected a render-complete event, got {other:?}"),
        }
        assert_eq!(
            summary.message,
            "2 QR badges complete! (1 lines failed due to incorrect format.)"
        );

        let names: Vec<_> = state
            .db()
            .batch()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn all_malformed_input_is_rejected_upfront() {
        let state = test_state(AssetCache::empty());
        // Pre-existing batch must survive a rejected run.
        state
            .db()
            .replace_batch(&[Artifact::new("Keep", vec![1])])
            .unwrap();
        let mut rx = state.subscribe();

        let result = run_bulk(&state, "no-separator-here\n").await;
        assert!(matches!(result, Err(PipelineError::EmptyBatch)));
        assert!(matches!(rx.try_recv(), Ok(UiEvent::Alert { .. })));
        assert_eq!(state.db().batch().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_replaces_previous_batch() {
        let Some(font) = find_system_font() else {
            return;
        };
        let state = test_state(AssetCache::empty().with_font_data(font));
        state
            .db()
            .replace_batch(&[Artifact::new("Old", vec![1])])
            .unwrap();

        run_bulk(&state, "1|New").await.unwrap();
        let names: Vec<_> = state
            .db()
            .batch()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["New"]);
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let Some(font) = find_system_font() else {
            return;
        };
        let state = test_state(AssetCache::empty().with_font_data(font));

        let summary = run_bulk(&state, "\n  \n1|Alice\n\n").await.unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.message, "1 QR badges complete!");
    }
}
