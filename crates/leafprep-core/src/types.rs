//! Core data types shared by the augmentation and segmentation pipelines.

use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};

/// A decoded source raster, immutable once loaded.
///
/// Owned by the pipeline invocation that loaded it. Transforms borrow it and
/// always return new buffers.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Path the raster was loaded from
    pub path: PathBuf,

    /// RGB8 pixel data
    pub pixels: RgbImage,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Format detected from the file content
    pub format: ImageFormat,

    /// Name of the immediate parent directory, if any
    pub class_label: Option<String>,
}

impl SourceImage {
    /// Wrap decoded pixels, deriving dimensions and class label.
    pub fn new(path: impl Into<PathBuf>, pixels: RgbImage, format: ImageFormat) -> Self {
        let path = path.into();
        let (width, height) = pixels.dimensions();
        let class_label = class_label_for(&path);
        Self {
            path,
            pixels,
            width,
            height,
            format,
            class_label,
        }
    }
}

/// Class label of an image: the name of its immediate parent directory.
pub fn class_label_for(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|parent| parent.file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Lossy file stem of a path, empty when the path has none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
