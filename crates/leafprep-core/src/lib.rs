//! leafprep core - dataset preparation for leaf image classifiers.
//!
//! Three independent jobs over a dataset laid out as one directory per class:
//!
//! ```text
//! distribution: class dirs → per-class image counts
//! augment:      JPEG → eligibility → 6 fixed transforms → <stem>_<kind>.JPG
//! segment:      image → saturation mask + LAB "a" contours → mask / ROI rasters
//! ```
//!
//! Augmentation is idempotent across runs: derivatives carry a suffix from a
//! fixed registry and are never treated as sources again.
//!
//! # Usage
//!
//! ```rust,ignore
//! use leafprep_core::{AugmentOutcome, Augmenter, Config};
//!
//! let config = Config::load()?;
//! let augmenter = Augmenter::new(&config);
//!
//! match augmenter.augment("plants/Apple_scab/leaf.JPG".as_ref())? {
//!     AugmentOutcome::Completed(report) => println!("{} written", report.written_count()),
//!     AugmentOutcome::Skipped { reason, .. } => println!("skipped: {reason}"),
//! }
//! ```

// Module declarations
pub mod augment;
pub mod config;
pub mod distribution;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod segment;
pub mod types;

// Re-exports for convenient access
pub use augment::{
    AugmentOptions, AugmentOutcome, AugmentReport, AugmentationKind, Augmenter, DerivativeOutcome,
    DerivedArtifact,
};
pub use config::Config;
pub use distribution::{ClassBucket, DistributionSummary};
pub use error::{ConfigError, LeafPrepError, PipelineError, PipelineResult, Result};
pub use pipeline::{Eligibility, EligibilityFilter, FileDiscovery, ImageDecoder, Rejection, Severity};
pub use report::{ReportFormat, ReportWriter, RunSummary};
pub use segment::{SegmentOutcome, SegmentReport, Segmentation, Segmenter};
pub use types::SourceImage;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
