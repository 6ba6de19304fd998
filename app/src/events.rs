//! Events published to the external UI collaborator.
//!
//! The transient/blocking split matters: toasts are "try again
//! silently", alerts require acknowledgment before the user proceeds.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// One event on the UI surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// One artifact finished rendering, carrying the final PNG bytes.
    RenderComplete { name: String, image: Vec<u8> },
    /// A pipeline run finished.
    RunSummary {
        succeeded: usize,
        failed: usize,
        message: String,
    },
    /// Transient notice.
    Toast { message: String },
    /// Blocking notice requiring acknowledgment.
    Alert { message: String },
}

pub type EventSender = broadcast::Sender<UiEvent>;

/// Create the event channel. Receivers that lag simply miss events.
pub fn channel() -> EventSender {
    broadcast::channel(256).0
}
