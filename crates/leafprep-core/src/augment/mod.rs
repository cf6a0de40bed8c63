//! Augmentation pipeline: one eligible source in, six derivatives out.
//!
//! - **kind**: the six kinds and their filename suffix registry
//! - **transforms**: the pure operators, one per kind
//!
//! [`Augmenter`] ties them together: it checks eligibility, loads the source
//! once, writes every derivative and records a per-kind outcome. A failed
//! write never stops the remaining kinds.

pub mod kind;
pub mod transforms;

pub use kind::{derived_suffix, destination_dir, AugmentationKind, SUFFIXES};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::decode::ImageDecoder;
use crate::pipeline::eligibility::{Eligibility, EligibilityFilter, Rejection};
use crate::types::SourceImage;

/// Options for a single augmentation run.
#[derive(Debug, Clone, Default)]
pub struct AugmentOptions {
    /// Compose a side-by-side collage of the source and its derivatives
    pub preview: bool,
}

/// A derivative that was written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedArtifact {
    /// Source the derivative was computed from
    pub source_path: PathBuf,

    /// Operator that produced it
    pub kind: AugmentationKind,

    /// Where it was written
    pub output_path: PathBuf,

    /// Derivative width in pixels
    pub width: u32,

    /// Derivative height in pixels
    pub height: u32,

    /// Derivative pixels
    #[serde(skip)]
    pub pixels: RgbImage,
}

/// Outcome of one kind for one source.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DerivativeOutcome {
    /// Derivative computed and written
    Written(DerivedArtifact),
    /// Derivative computed but could not be written
    Failed {
        kind: AugmentationKind,
        output_path: PathBuf,
        error: String,
    },
}

impl DerivativeOutcome {
    /// Kind this outcome belongs to.
    pub fn kind(&self) -> AugmentationKind {
        match self {
            DerivativeOutcome::Written(artifact) => artifact.kind,
            DerivativeOutcome::Failed { kind, .. } => *kind,
        }
    }

    /// Destination path, written or not.
    pub fn output_path(&self) -> &Path {
        match self {
            DerivativeOutcome::Written(artifact) => &artifact.output_path,
            DerivativeOutcome::Failed { output_path, .. } => output_path,
        }
    }
}

/// Per-kind outcomes for one augmented source.
#[derive(Debug, Clone, Serialize)]
pub struct AugmentReport {
    /// Source image path
    pub source_path: PathBuf,

    /// Class label of the source, if it has a parent directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,

    /// One outcome per kind, in [`AugmentationKind::ALL`] order
    pub outcomes: Vec<DerivativeOutcome>,

    /// Horizontal collage (source first, then every derivative), when requested
    #[serde(skip)]
    pub preview: Option<RgbImage>,
}

impl AugmentReport {
    /// Number of derivatives written.
    pub fn written_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DerivativeOutcome::Written(_)))
            .count()
    }

    /// Number of derivatives that failed to write.
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.written_count()
    }

    /// Whether every kind was written.
    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0 && self.outcomes.len() == AugmentationKind::ALL.len()
    }

    /// Drop the in-memory rasters, keeping only what reports serialize.
    pub fn discard_rasters(&mut self) {
        self.preview = None;
        for outcome in &mut self.outcomes {
            if let DerivativeOutcome::Written(artifact) = outcome {
                artifact.pixels = RgbImage::new(0, 0);
            }
        }
    }
}

/// What happened to one candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AugmentOutcome {
    /// Source was augmented (possibly with per-kind failures)
    Completed(AugmentReport),
    /// Source was not eligible; nothing was written
    Skipped {
        path: PathBuf,
        #[serde(flatten)]
        reason: Rejection,
    },
}

/// Applies the transform set to eligible sources and writes the derivatives.
#[derive(Debug, Clone)]
pub struct Augmenter {
    filter: EligibilityFilter,
    decoder: ImageDecoder,
    output_dir: Option<PathBuf>,
    jpeg_quality: u8,
}

impl Augmenter {
    /// Create an augmenter from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            filter: EligibilityFilter::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            output_dir: config.output_dir(),
            jpeg_quality: config.output.jpeg_quality,
        }
    }

    /// Write derivatives into `dir` instead of next to each source.
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    /// Destination directory, if one is configured.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Augment one candidate path with default options.
    pub fn augment(&self, path: &Path) -> PipelineResult<AugmentOutcome> {
        self.augment_with_options(path, &AugmentOptions::default())
    }

    /// Augment one candidate path.
    ///
    /// Ineligible candidates come back as `Skipped`. Only a failure to decode
    /// an eligible source is an `Err`; write failures are recorded per kind.
    pub fn augment_with_options(
        &self,
        path: &Path,
        options: &AugmentOptions,
    ) -> PipelineResult<AugmentOutcome> {
        let start = std::time::Instant::now();

        if let Eligibility::Rejected(reason) = self.filter.check(path) {
            tracing::debug!("Skipping {:?}: {}", path, reason);
            return Ok(AugmentOutcome::Skipped {
                path: path.to_path_buf(),
                reason,
            });
        }

        let source = self.decoder.load(path)?;
        let report = self.augment_source(&source, options);

        tracing::debug!(
            "Augmented {:?} in {:?} ({}/{} written)",
            path,
            start.elapsed(),
            report.written_count(),
            report.outcomes.len()
        );
        Ok(AugmentOutcome::Completed(report))
    }

    /// Compute and write every derivative of an already-loaded source.
    pub fn augment_source(&self, source: &SourceImage, options: &AugmentOptions) -> AugmentReport {
        let dir_error = self.prepare_output_dir(&source.path).err();

        let outcomes: Vec<DerivativeOutcome> = AugmentationKind::ALL
            .iter()
            .map(|&kind| {
                let stage_start = std::time::Instant::now();
                let pixels = transforms::apply(kind, &source.pixels);
                let output_path = kind.output_path(&source.path, self.output_dir.as_deref());

                let written = match &dir_error {
                    Some(e) => Err(e.to_string()),
                    None => self
                        .write_jpeg(&pixels, &output_path)
                        .map_err(|e| e.to_string()),
                };
                tracing::trace!("  {}: {:?}", kind, stage_start.elapsed());

                match written {
                    Ok(()) => DerivativeOutcome::Written(DerivedArtifact {
                        source_path: source.path.clone(),
                        kind,
                        output_path,
                        width: pixels.width(),
                        height: pixels.height(),
                        pixels,
                    }),
                    Err(error) => {
                        tracing::warn!("Failed to write {:?}: {}", output_path, error);
                        DerivativeOutcome::Failed {
                            kind,
                            output_path,
                            error,
                        }
                    }
                }
            })
            .collect();

        let preview = options.preview.then(|| {
            let derivatives: Vec<RgbImage> = outcomes
                .iter()
                .map(|outcome| match outcome {
                    DerivativeOutcome::Written(artifact) => artifact.pixels.clone(),
                    DerivativeOutcome::Failed { kind, .. } => {
                        transforms::apply(*kind, &source.pixels)
                    }
                })
                .collect();
            collage(&source.pixels, &derivatives)
        });

        AugmentReport {
            source_path: source.path.clone(),
            class_label: source.class_label.clone(),
            outcomes,
            preview,
        }
    }

    /// Create the destination directory for `source`; "already exists" is not an error.
    fn prepare_output_dir(&self, source: &Path) -> PipelineResult<()> {
        if let Some(root) = &self.output_dir {
            let dir = destination_dir(source, root);
            std::fs::create_dir_all(&dir).map_err(|e| PipelineError::Write {
                path: dir,
                message: format!("Cannot create output directory: {}", e),
            })?;
        }
        Ok(())
    }

    fn write_jpeg(&self, pixels: &RgbImage, path: &Path) -> PipelineResult<()> {
        let to_write_error = |message: String| PipelineError::Write {
            path: path.to_path_buf(),
            message,
        };

        let file = File::create(path).map_err(|e| to_write_error(e.to_string()))?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), self.jpeg_quality);
        pixels
            .write_with_encoder(encoder)
            .map_err(|e| to_write_error(e.to_string()))
    }
}

/// Lay `original` and `derivatives` side by side, each resized to the
/// original's dimensions.
pub fn collage(original: &RgbImage, derivatives: &[RgbImage]) -> RgbImage {
    let (width, height) = original.dimensions();
    let tiles = 1 + derivatives.len() as u32;
    let mut canvas = RgbImage::new(width * tiles, height);

    for (i, tile) in std::iter::once(original).chain(derivatives).enumerate() {
        let x = i as i64 * width as i64;
        if tile.dimensions() == (width, height) {
            imageops::replace(&mut canvas, tile, x, 0);
        } else {
            let resized = imageops::resize(tile, width, height, FilterType::Triangle);
            imageops::replace(&mut canvas, &resized, x, 0);
        }
    }
    canvas
}
