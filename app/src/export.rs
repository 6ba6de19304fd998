//! Selective archive export of batch artifacts.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::warn;

use badge_store::Artifact;

use crate::app::SharedState;
use crate::events::UiEvent;

/// Export error type.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] badge_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not retrieve image data for any selected badge")]
    NothingRetrievable,
}

/// Outcome of a successful export.
#[derive(Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub packed: usize,
    pub skipped: usize,
}

/// Package the selected batch artifacts into one `.tar.gz` archive.
///
/// An empty selection is a no-op with a transient notice. Selected
/// names without retrievable image data are skipped and counted; when
/// nothing is retrievable the export fails with a blocking error
/// instead of producing an empty archive.
pub fn export_selected(
    state: &SharedState,
    selection: &[String],
    out_dir: &Path,
) -> Result<Option<ExportOutcome>, ExportError> {
    if selection.is_empty() {
        state.emit(UiEvent::Toast {
            message: "No badges selected.".into(),
        });
        return Ok(None);
    }

    let batch = state.db().batch()?;
    let mut chosen: Vec<&Artifact> = Vec::new();
    let mut skipped = 0usize;

    for name in selection {
        // Case-variant repeats of an already-chosen name are ignored.
        if chosen.iter().any(|a| a.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        match batch.iter().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(artifact) if !artifact.image.is_empty() => chosen.push(artifact),
            _ => {
                warn!(name = %name, "selected badge has no retrievable image data");
                skipped += 1;
            }
        }
    }

    if chosen.is_empty() {
        state.emit(UiEvent::Alert {
            message: "Error: Could not retrieve image data.".into(),
        });
        return Err(ExportError::NothingRetrievable);
    }

    let filename = format!("badges-{}.tar.gz", Utc::now().format("%Y-%m-%d_%H%M%S"));
    let path = out_dir.join(filename);
    let file = File::create(&path)?;
    write_archive(file, &chosen)?;

    state.emit(UiEvent::Toast {
        message: format!("Packed {} badges.", chosen.len()),
    });

    Ok(Some(ExportOutcome {
        path,
        packed: chosen.len(),
        skipped,
    }))
}

/// Write one artifact as `<sanitized-name>.png` under `dir`.
pub fn write_badge_png(artifact: &Artifact, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{}.png", sanitize_filename(&artifact.name)));
    std::fs::write(&path, &artifact.image)?;
    Ok(path)
}

fn write_archive<W: Write>(writer: W, artifacts: &[&Artifact]) -> Result<(), ExportError> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for artifact in artifacts {
        let entry_name = format!("{}.png", sanitize_filename(&artifact.name));

        let mut header = tar::Header::new_gnu();
        header.set_size(artifact.image.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar.append_data(&mut header, entry_name, artifact.image.as_slice())?;
    }

    tar.finish()?;
    Ok(())
}

/// Keep letters, digits, underscore, hyphen; replace everything else
/// with underscore.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
