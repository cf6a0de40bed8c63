//! Leaf segmentation: foreground mask and ROI contour overlay.
//!
//! Two independent passes over the source:
//!
//! ```text
//! RGB → HSV saturation → threshold(85) → mask → masked preview
//! RGB → LAB "a"        → threshold(100) → contours → ROI overlay
//! ```
//!
//! The overlay depends on the contour set, so it is drawn last.

pub mod color;
pub mod contour;
pub mod mask;

pub use contour::RoiContour;

use image::{GrayImage, ImageFormat, RgbImage};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::decode::ImageDecoder;
use crate::pipeline::eligibility::{Eligibility, EligibilityFilter, Rejection};
use crate::types::{file_stem, SourceImage};

/// Saturation level at or above which a pixel is foreground.
pub const SATURATION_THRESHOLD: u8 = 85;

/// LAB "a" level at or above which a pixel is foreground for contour tracing.
pub const LAB_A_THRESHOLD: u8 = 100;

/// Contours and the overlay they were drawn on.
#[derive(Debug, Clone)]
pub struct RoiResult {
    /// Copy of the source with the contours drawn on it
    pub source_copy: RgbImage,

    /// Borders of the LAB "a" mask's foreground regions
    pub contours: Vec<RoiContour>,
}

/// Everything produced for one source.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Source image path
    pub source_path: PathBuf,

    /// Class label of the source, if known
    pub class_label: Option<String>,

    /// Binary saturation mask
    pub mask: GrayImage,

    /// Source with background painted white
    pub masked: RgbImage,

    /// Contour overlay
    pub roi: RoiResult,
}

/// Serializable summary of a segmentation.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    /// Source image path
    pub source_path: PathBuf,

    /// Class label of the source, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,

    /// Mask width in pixels
    pub width: u32,

    /// Mask height in pixels
    pub height: u32,

    /// Foreground pixels in the saturation mask
    pub foreground_pixels: usize,

    /// Number of ROI contours
    pub contour_count: usize,

    /// Rasters written for this source
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PathBuf>,
}

impl Segmentation {
    /// Summary of this segmentation, with no outputs recorded yet.
    pub fn report(&self) -> SegmentReport {
        SegmentReport {
            source_path: self.source_path.clone(),
            class_label: self.class_label.clone(),
            width: self.mask.width(),
            height: self.mask.height(),
            foreground_pixels: mask::foreground_count(&self.mask),
            contour_count: self.roi.contours.len(),
            outputs: Vec::new(),
        }
    }

    /// Write the mask, masked preview and ROI overlay as PNG files.
    ///
    /// Files go to `root/<class_label>/` (or `root/` without a label) and are
    /// named `<stem>_mask.png`, `<stem>_masked.png` and `<stem>_roi.png`.
    pub fn save(&self, root: &Path) -> PipelineResult<Vec<PathBuf>> {
        let dir = match &self.class_label {
            Some(label) => root.join(label),
            None => root.to_path_buf(),
        };
        std::fs::create_dir_all(&dir).map_err(|e| PipelineError::Write {
            path: dir.clone(),
            message: format!("Cannot create output directory: {}", e),
        })?;

        let stem = file_stem(&self.source_path);
        let mask_path = dir.join(format!("{stem}_mask.png"));
        let masked_path = dir.join(format!("{stem}_masked.png"));
        let roi_path = dir.join(format!("{stem}_roi.png"));

        save_png(&self.mask, &mask_path)?;
        save_png(&self.masked, &masked_path)?;
        save_png(&self.roi.source_copy, &roi_path)?;

        Ok(vec![mask_path, masked_path, roi_path])
    }
}

fn save_png<P>(image: &image::ImageBuffer<P, Vec<u8>>, path: &Path) -> PipelineResult<()>
where
    P: image::PixelWithColorType<Subpixel = u8>,
{
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| PipelineError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// What happened to one segmentation candidate.
#[derive(Debug, Clone)]
pub enum SegmentOutcome {
    /// Source was segmented
    Completed(Segmentation),
    /// Source was not eligible; nothing was computed
    Skipped { path: PathBuf, reason: Rejection },
}

/// Extracts the leaf mask and ROI overlay from source images.
#[derive(Debug, Clone)]
pub struct Segmenter {
    filter: EligibilityFilter,
    decoder: ImageDecoder,
}

impl Segmenter {
    /// Create a segmenter from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            filter: EligibilityFilter::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
        }
    }

    /// Load and segment one candidate.
    ///
    /// Candidates go through the same eligibility check as augmentation:
    /// non-JPEG content and derivatives come back as `Skipped`. An eligible
    /// source that fails to decode fails the call as a whole.
    pub fn segment(&self, path: &Path) -> PipelineResult<SegmentOutcome> {
        let start = std::time::Instant::now();

        if let Eligibility::Rejected(reason) = self.filter.check(path) {
            tracing::debug!("Skipping {:?}: {}", path, reason);
            return Ok(SegmentOutcome::Skipped {
                path: path.to_path_buf(),
                reason,
            });
        }

        let source = self.decoder.load(path)?;
        let segmentation = segment_image(&source);
        tracing::debug!(
            "Segmented {:?} in {:?} ({} contours)",
            path,
            start.elapsed(),
            segmentation.roi.contours.len()
        );
        Ok(SegmentOutcome::Completed(segmentation))
    }
}

/// Segment an already-loaded source. Pure: the source is never modified.
pub fn segment_image(source: &SourceImage) -> Segmentation {
    let saturation = color::saturation_channel(&source.pixels);
    let leaf_mask = mask::threshold(&saturation, SATURATION_THRESHOLD);
    let masked = mask::apply_mask(&source.pixels, &leaf_mask);

    let a_channel = color::lab_a_channel(&source.pixels);
    let roi_mask = mask::threshold(&a_channel, LAB_A_THRESHOLD);
    let contours = contour::extract_contours(&roi_mask);
    let source_copy = contour::draw_contours(&source.pixels, &contours);

    Segmentation {
        source_path: source.path.clone(),
        class_label: source.class_label.clone(),
        mask: leaf_mask,
        masked,
        roi: RoiResult {
            source_copy,
            contours,
        },
    }
}
