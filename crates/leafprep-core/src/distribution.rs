//! Per-class image counts for a dataset laid out as one directory per class.
//!
//! Counting is filename-based: a file counts when its extension is on the
//! image allow-list. Nothing is decoded here, so the numbers are a cheap
//! approximation of what the augmentation pipeline would accept.

use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};

/// Extensions counted as images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Image count of one class subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassBucket {
    /// Subdirectory name, i.e. the class label
    pub directory_name: String,

    /// Allow-listed files directly inside the subdirectory
    pub eligible_image_count: usize,
}

/// Check whether `path` has an allow-listed image extension.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Count images per immediate subdirectory of `root`, sorted by name.
pub fn analyze(root: &Path) -> PipelineResult<Vec<ClassBucket>> {
    if !root.is_dir() {
        return Err(PipelineError::NotADirectory(root.to_path_buf()));
    }

    let mut buckets = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let directory_name = entry.file_name().to_string_lossy().into_owned();
        let eligible_image_count = count_images(entry.path());
        tracing::debug!("{}: {} images", directory_name, eligible_image_count);
        buckets.push(ClassBucket {
            directory_name,
            eligible_image_count,
        });
    }

    if buckets.is_empty() {
        return Err(PipelineError::NoSubdirectories(root.to_path_buf()));
    }
    if buckets.iter().all(|b| b.eligible_image_count == 0) {
        return Err(PipelineError::EmptyDataset(root.to_path_buf()));
    }

    Ok(buckets)
}

fn count_images(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_image_extension(e.path()))
        .count()
}

/// One bucket with its share of the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ClassShare {
    #[serde(flatten)]
    pub bucket: ClassBucket,

    /// Percentage of all counted images, 0-100
    pub percentage: f64,
}

/// Buckets plus totals, ready for a table or chart.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionSummary {
    pub total: usize,
    pub classes: Vec<ClassShare>,
}

impl DistributionSummary {
    pub fn from_buckets(buckets: Vec<ClassBucket>) -> Self {
        let total: usize = buckets.iter().map(|b| b.eligible_image_count).sum();
        let classes = buckets
            .into_iter()
            .map(|bucket| {
                let percentage = if total == 0 {
                    0.0
                } else {
                    bucket.eligible_image_count as f64 * 100.0 / total as f64
                };
                ClassShare { bucket, percentage }
            })
            .collect();
        Self { total, classes }
    }

    /// The largest class count, or 0 when there are no classes.
    pub fn max_count(&self) -> usize {
        self.classes
            .iter()
            .map(|c| c.bucket.eligible_image_count)
            .max()
            .unwrap_or(0)
    }
}
