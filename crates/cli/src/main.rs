//! LPR Fusion CLI
//!
//! Command-line driver for the license-plate fusion stage. Batches are read
//! as JSON lines; forwarded side-data records are written to stdout and logs
//! go to stderr.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod parser;

use commands::decode::DecodeCommand;
use commands::metrics::MetricsCommand;
use commands::run::RunCommand;

#[derive(Parser)]
#[command(
    name = "lpr-fusion",
    version,
    about = "Fuse vehicle and license-plate detections into per-vehicle records",
    after_help = "EXAMPLES:\n  \
                  # Stream batches through the fusion stage\n  \
                  lpr-fusion run batches.jsonl > records.jsonl\n  \
                  cat batches.jsonl | lpr-fusion run --output-dir ./audit\n\n  \
                  # Disable detection files\n  \
                  lpr-fusion run --output-dir \"\" batches.jsonl\n\n  \
                  # Decode raw recognizer output\n  \
                  lpr-fusion decode --network-width 24 0,0,1,35,35,2 0.9,0.5,0.8,0.1,0.1,0.7\n\n  \
                  # Score detection files against COCO annotations\n  \
                  lpr-fusion metrics --coco instances_default.json --detections-dir logs/detections\n\n\
                  ENVIRONMENT:\n  \
                  DETECTION_OUTPUT_DIR   detection file directory (default logs/detections)\n  \
                  LPR_DICTIONARY_PATH    plate character dictionary"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fusion pipeline over JSON-lines batches
    Run(RunCommand),

    /// Decode one recognizer output into plate text
    Decode(DecodeCommand),

    /// Score detection files against COCO ground truth
    Metrics(MetricsCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // stdout carries the record stream
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Run(cmd) => cmd.execute(),
        Commands::Decode(cmd) => cmd.execute(),
        Commands::Metrics(cmd) => cmd.execute(),
    }
}
