//! clipbench command-line interface.
//!
//! Dispatches exactly one caller-facing operation per invocation. The
//! recovery sweep runs after the store is opened and before any command,
//! so interrupted jobs from a dead process are repaired first.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipbench_engine::{EngineConfig, Library};
use clipbench_models::{ReviewStatus, SegmentMode, VideoId, VideoRecord};

#[derive(Parser, Debug)]
#[command(name = "clipbench", about = "Segment videos into fixed-duration clips")]
struct Cli {
    /// Root storage directory (overrides CLIPBENCH_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all videos, newest first
    List,
    /// Ingest a local video file
    Add {
        /// Path to the source video
        file: PathBuf,
    },
    /// Show the full record for a video
    Show { id: String },
    /// Probe the source file and store its metadata
    Probe { id: String },
    /// Set the review status
    Review {
        id: String,
        #[arg(value_enum)]
        status: ReviewArg,
    },
    /// Generate clips
    Generate {
        id: String,
        /// Re-encode once for exact chunk durations
        #[arg(long)]
        precise: bool,
    },
    /// Force a full re-run, ignoring existing outputs
    Regenerate {
        id: String,
        #[arg(long)]
        precise: bool,
    },
    /// Delete a video and all of its artifacts
    Delete { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReviewArg {
    Pending,
    Approved,
    Rejected,
}

impl From<ReviewArg> for ReviewStatus {
    fn from(arg: ReviewArg) -> Self {
        match arg {
            ReviewArg::Pending => ReviewStatus::Pending,
            ReviewArg::Approved => ReviewStatus::Approved,
            ReviewArg::Rejected => ReviewStatus::Rejected,
        }
    }
}

fn mode_for(precise: bool) -> SegmentMode {
    if precise {
        SegmentMode::Precise
    } else {
        SegmentMode::Fast
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("clipbench=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn print_summary(record: &VideoRecord) {
    println!(
        "{}  {:<11}  {:<8}  {} clips",
        record.id,
        record.clip_state.as_str(),
        record.review_status.as_str(),
        record.outputs.len()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env();
    if let Some(root) = cli.root {
        config.storage_root = root;
    }

    let library = Library::open(config);

    // Repair any job state left behind by a dead process before taking
    // commands.
    let repaired = library.recover_interrupted().await?;
    if repaired > 0 {
        info!(repaired, "repaired interrupted jobs at startup");
    }

    match cli.command {
        Command::List => {
            for record in library.list().await? {
                print_summary(&record);
            }
        }
        Command::Add { file } => {
            let record = library.ingest(&file).await?;
            println!("{}", record.id);
        }
        Command::Show { id } => {
            let record = library.get(&VideoId::from(id)).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Probe { id } => {
            let info = library.probe_metadata(&VideoId::from(id)).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Review { id, status } => {
            let record = library
                .set_review_status(&VideoId::from(id), status.into())
                .await?;
            print_summary(&record);
        }
        Command::Generate { id, precise } => {
            let outcome = library
                .generate(&VideoId::from(id), mode_for(precise))
                .await
                .context("clip generation failed")?;
            println!(
                "{} clips in {:.2}s",
                outcome.outputs.len(),
                outcome.elapsed_seconds
            );
            for clip in &outcome.outputs {
                println!(
                    "  {}  {:>8.2}s -> {:>8.2}s  ({:.2}s)",
                    clip.file_name, clip.start_secs, clip.end_secs, clip.duration_secs
                );
            }
        }
        Command::Regenerate { id, precise } => {
            let outcome = library
                .regenerate(&VideoId::from(id), mode_for(precise))
                .await
                .context("clip regeneration failed")?;
            println!(
                "{} clips in {:.2}s",
                outcome.outputs.len(),
                outcome.elapsed_seconds
            );
        }
        Command::Delete { id } => {
            library.delete(&VideoId::from(id)).await?;
            println!("deleted");
        }
    }

    Ok(())
}
