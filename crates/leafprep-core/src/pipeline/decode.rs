//! Raster loading with content-based format detection.

use image::{ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::SourceImage;

/// Loads source rasters, detecting the format from the bytes rather than the
/// file extension.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Detect the encoding of a file with a bounded decode probe.
    ///
    /// Only the header and dimensions are read. Returns `UnsupportedFormat`
    /// when no known signature matches and `Decode` when a recognized header
    /// cannot be parsed.
    pub fn probe(&self, path: &Path) -> PipelineResult<ImageFormat> {
        let reader = open_reader(path)?;
        let format = reader
            .format()
            .ok_or_else(|| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: "unknown".to_string(),
            })?;

        reader
            .into_dimensions()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(format)
    }

    /// Fully decode a file into an immutable RGB8 [`SourceImage`].
    pub fn load(&self, path: &Path) -> PipelineResult<SourceImage> {
        let start = std::time::Instant::now();
        let reader = open_reader(path)?;
        let format = reader
            .format()
            .ok_or_else(|| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: "unknown".to_string(),
            })?;

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let max_dim = self.limits.max_image_dimension;
        if image.width() > max_dim || image.height() > max_dim {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width: image.width(),
                height: image.height(),
                max_dim,
            });
        }

        let source = SourceImage::new(path, image.to_rgb8(), format);
        tracing::trace!(
            "  Decode {:?}: {}x{} in {:?}",
            path,
            source.width,
            source.height,
            start.elapsed()
        );
        Ok(source)
    }
}

/// Open a reader whose format comes from the content signature only.
fn open_reader(path: &Path) -> PipelineResult<ImageReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
        _ => PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        },
    })?;

    ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })
}

/// Short lowercase name of an image format ("jpeg", "png", ...).
pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Tiff => "tiff",
        other => other.extensions_str().first().copied().unwrap_or("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(path: &Path, format: ImageFormat) {
        let img = RgbImage::from_pixel(16, 12, Rgb([30, 140, 60]));
        img.save_with_format(path, format).unwrap();
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_name(ImageFormat::Png), "png");
        assert_eq!(format_name(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_probe_detects_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.JPG");
        write_image(&path, ImageFormat::Jpeg);

        let decoder = ImageDecoder::new(LimitsConfig::default());
        assert_eq!(decoder.probe(&path).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_format_detected_by_content() {
        // A PNG with a .jpg extension is still a PNG.
        let dir = tempfile::tempdir().unwrap();
        let misnamed = dir.path().join("misnamed.jpg");
        write_image(&misnamed, ImageFormat::Png);

        let decoder = ImageDecoder::new(LimitsConfig::default());
        assert_eq!(decoder.probe(&misnamed).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_probe_unknown_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder.probe(&path).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_probe_missing_file() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder.probe(Path::new("/nonexistent/leaf.JPG")).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn test_load_returns_rgb_source() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("Apple_healthy");
        std::fs::create_dir(&class_dir).unwrap();
        let path = class_dir.join("leaf.JPG");
        write_image(&path, ImageFormat::Jpeg);

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let source = decoder.load(&path).unwrap();
        assert_eq!((source.width, source.height), (16, 12));
        assert_eq!(source.format, ImageFormat::Jpeg);
        assert_eq!(source.class_label.as_deref(), Some("Apple_healthy"));
    }

    #[test]
    fn test_load_enforces_dimension_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.JPG");
        write_image(&path, ImageFormat::Jpeg);

        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 8,
            ..LimitsConfig::default()
        });
        let err = decoder.load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ImageTooLarge { .. }));
    }
}
