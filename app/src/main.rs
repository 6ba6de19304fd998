//! Badge Forge CLI — drives the generation pipelines and the exporter.
//!
//! Stands in for the external UI collaborator: it forwards submitted
//! records, answers the single-record confirmation checkpoint, and
//! prints the events the pipelines publish.

use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use badge_forge::app::SharedState;
use badge_forge::events::UiEvent;
use badge_forge::export;
use badge_forge::pipeline::{self, SinglePipeline};
use badge_forge::record::Record;

#[derive(Parser)]
#[command(name = "badge-forge", version, about = "Generate styled QR badge images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one badge from an identifier and a label.
    Single {
        identifier: String,
        label: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
        /// Also save the badge as a PNG into this directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate badges for every line of a file (`-` for stdin).
    Bulk { input: PathBuf },
    /// Export selected batch badges into one archive.
    Export {
        /// Badge names to include (case-insensitive).
        names: Vec<String>,
        /// Select every badge in the batch.
        #[arg(long)]
        all: bool,
        /// Directory the archive is written to (defaults to `exports/`
        /// inside the data directory).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List generation history, newest first.
    History {
        /// Delete all history entries.
        #[arg(long)]
        clear: bool,
    },
    /// List the current bulk batch.
    Batch {
        /// Delete the current batch.
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let (db, config, assets, dir) = badge_forge::init_foundation()?;
    let state = SharedState::new(db, config, assets, dir);
    spawn_event_printer(&state);

    match cli.command {
        Command::Single {
            identifier,
            label,
            yes,
            output,
        } => run_single(&state, &identifier, &label, yes, output.as_deref()).await?,
        Command::Bulk { input } => run_bulk(&state, &input).await?,
        Command::Export { names, all, output } => run_export(&state, names, all, output)?,
        Command::History { clear } => run_history(&state, clear)?,
        Command::Batch { clear } => run_batch(&state, clear)?,
    }

    // Let the spawned printer drain pending events before exit.
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

async fn run_single(
    state: &SharedState,
    identifier: &str,
    label: &str,
    yes: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut pipeline = SinglePipeline::new(state.clone());
    let record = pipeline.submit(identifier, label)?.clone();

    if !yes && !confirm_on_stdin(&record, state.config().separator)? {
        pipeline.cancel();
        println!("Cancelled.");
        return Ok(());
    }

    let artifact = pipeline.confirm().await?;
    println!(
        "Generated badge '{}' ({} bytes).",
        artifact.name,
        artifact.image.len()
    );

    if let Some(dir) = output {
        std::fs::create_dir_all(dir)?;
        let path = export::write_badge_png(&artifact, dir)?;
        println!("Saved {}.", path.display());
    }
    Ok(())
}

async fn run_bulk(state: &SharedState, input: &PathBuf) -> anyhow::Result<()> {
    let text = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };

    let summary = pipeline::run_bulk(state, &text).await?;
    println!("{}", summary.message);
    Ok(())
}

fn run_export(
    state: &SharedState,
    names: Vec<String>,
    all: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let selection = if all {
        state.db().batch()?.into_iter().map(|a| a.name).collect()
    } else {
        names
    };

    let out_dir = output.unwrap_or_else(|| state.data_dir().join("exports"));
    std::fs::create_dir_all(&out_dir)?;

    if let Some(outcome) = export::export_selected(state, &selection, &out_dir)? {
        println!(
            "Exported {} badges to {} ({} skipped).",
            outcome.packed,
            outcome.path.display(),
            outcome.skipped
        );
    }
    Ok(())
}

fn run_history(state: &SharedState, clear: bool) -> anyhow::Result<()> {
    if clear {
        state.db().clear_history()?;
        state.emit(UiEvent::Toast {
            message: "QR history cleared!".into(),
        });
        return Ok(());
    }
    for artifact in state.db().history()? {
        println!("{} ({} bytes)", artifact.name, artifact.image.len());
    }
    Ok(())
}

fn run_batch(state: &SharedState, clear: bool) -> anyhow::Result<()> {
    if clear {
        state.db().clear_batch()?;
        state.emit(UiEvent::Toast {
            message: "All previews cleared.".into(),
        });
        return Ok(());
    }
    for artifact in state.db().batch()? {
        println!("{} ({} bytes)", artifact.name, artifact.image.len());
    }
    Ok(())
}

/// The single-record confirmation checkpoint.
fn confirm_on_stdin(record: &Record, separator: char) -> anyhow::Result<bool> {
    print!(
        "Encode '{}' as a badge for '{}'? [y/N] ",
        record.payload(separator),
        record.label
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn spawn_event_printer(state: &SharedState) {
    let mut rx = state.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                UiEvent::RenderComplete { name, image } => {
                    println!("rendered: {name} ({} bytes)", image.len());
                }
                UiEvent::RunSummary { message, .. } => println!("{message}"),
                UiEvent::Toast { message } => println!("{message}"),
                UiEvent::Alert { message } => eprintln!("! {message}"),
            }
        }
    });
}
