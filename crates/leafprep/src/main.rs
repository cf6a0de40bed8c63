//! leafprep CLI - prepare leaf image datasets for a classifier.
//!
//! Counts images per class, writes six deterministic augmentations per
//! source, and extracts segmentation masks and ROI overlays.
//!
//! # Usage
//!
//! ```bash
//! # Per-class image counts, with a pie + bar chart
//! leafprep distribution ./plants --chart distribution.svg
//!
//! # Augment every JPEG under a directory (re-runs skip derivatives)
//! leafprep augment ./plants/Apple_scab --report augment.jsonl --format jsonl
//!
//! # Segment a glob of images
//! leafprep segment "./plants/*/image (1).JPG" -o ./segmentation
//!
//! # View configuration
//! leafprep config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// leafprep - augment, segment and inspect leaf image datasets.
#[derive(Parser, Debug)]
#[command(name = "leafprep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the six augmented derivatives of each source JPEG
    Augment(cli::augment::AugmentArgs),

    /// Extract the leaf mask and ROI contour overlay of each image
    Segment(cli::segment::SegmentArgs),

    /// Count images per class directory
    Distribution(cli::distribution::DistributionArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match leafprep_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `leafprep config path`."
            );
            leafprep_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("leafprep v{}", leafprep_core::VERSION);

    match cli.command {
        Commands::Augment(args) => cli::augment::execute(args, config).await,
        Commands::Segment(args) => cli::segment::execute(args, config).await,
        Commands::Distribution(args) => cli::distribution::execute(args),
        Commands::Config(args) => cli::config::execute(args),
    }
}
