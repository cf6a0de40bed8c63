//! Eligibility of candidate paths for augmentation.
//!
//! A candidate is eligible when it is an existing regular file within the size
//! limit, its bytes decode as JPEG, and its stem does not carry a derivative
//! suffix. The suffix rule makes repeated batch runs idempotent.

use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::augment::kind::derived_suffix;
use crate::config::LimitsConfig;
use crate::error::PipelineError;

use super::decode::{format_name, ImageDecoder};

/// Why a candidate was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Path does not exist
    NotFound,
    /// Path is not a regular file
    NotAFile,
    /// Stem ends with a derivative suffix
    AlreadyDerived { suffix: String },
    /// File exceeds the configured size limit
    FileTooLarge { size_mb: u64, max_mb: u64 },
    /// Content is not JPEG
    UnsupportedFormat { format: String },
    /// JPEG header could not be parsed
    Unreadable { message: String },
}

/// How a rejection should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected, harmless skip
    Skip,
    /// The candidate was meant to be processed but could not be
    Failure,
}

impl Rejection {
    /// Severity of this rejection.
    pub fn severity(&self) -> Severity {
        match self {
            Rejection::AlreadyDerived { .. } | Rejection::UnsupportedFormat { .. } => {
                Severity::Skip
            }
            _ => Severity::Failure,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotFound => write!(f, "file not found"),
            Rejection::NotAFile => write!(f, "not a file"),
            Rejection::AlreadyDerived { suffix } => {
                write!(f, "already a derivative ({suffix})")
            }
            Rejection::FileTooLarge { size_mb, max_mb } => {
                write!(f, "file too large ({size_mb}MB > {max_mb}MB)")
            }
            Rejection::UnsupportedFormat { format } => write!(f, "not a JPEG image ({format})"),
            Rejection::Unreadable { message } => write!(f, "unreadable image: {message}"),
        }
    }
}

/// Result of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Candidate may be processed
    Eligible { format: ImageFormat },
    /// Candidate must be skipped
    Rejected(Rejection),
}

impl Eligibility {
    /// Whether the candidate was accepted.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }
}

/// Decides which candidate paths are processable source images.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    decoder: ImageDecoder,
    limits: LimitsConfig,
}

impl EligibilityFilter {
    /// Create a new filter with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            decoder: ImageDecoder::new(limits.clone()),
            limits,
        }
    }

    /// Whether `path` is an eligible source image.
    pub fn is_eligible(&self, path: &Path) -> bool {
        self.check(path).is_eligible()
    }

    /// Check a candidate, reporting why it was rejected.
    ///
    /// Cheap checks run first; the decode probe only reads the header.
    pub fn check(&self, path: &Path) -> Eligibility {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return Eligibility::Rejected(Rejection::NotFound),
        };
        if !metadata.is_file() {
            return Eligibility::Rejected(Rejection::NotAFile);
        }

        if let Some(suffix) = derived_suffix(path) {
            return Eligibility::Rejected(Rejection::AlreadyDerived {
                suffix: suffix.to_string(),
            });
        }

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Eligibility::Rejected(Rejection::FileTooLarge {
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        match self.decoder.probe(path) {
            Ok(ImageFormat::Jpeg) => Eligibility::Eligible {
                format: ImageFormat::Jpeg,
            },
            Ok(other) => Eligibility::Rejected(Rejection::UnsupportedFormat {
                format: format_name(other).to_string(),
            }),
            Err(PipelineError::UnsupportedFormat { format, .. }) => {
                Eligibility::Rejected(Rejection::UnsupportedFormat { format })
            }
            Err(PipelineError::NotFound(_)) => Eligibility::Rejected(Rejection::NotFound),
            Err(e) => Eligibility::Rejected(Rejection::Unreadable {
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::AugmentationKind;
    use image::{Rgb, RgbImage};

    fn write_image(path: &Path, format: ImageFormat) {
        let img = RgbImage::from_pixel(8, 8, Rgb([40, 160, 70]));
        img.save_with_format(path, format).unwrap();
    }

    fn filter() -> EligibilityFilter {
        EligibilityFilter::new(LimitsConfig::default())
    }

    #[test]
    fn test_jpeg_source_is_eligible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.JPG");
        write_image(&path, ImageFormat::Jpeg);

        assert_eq!(
            filter().check(&path),
            Eligibility::Eligible {
                format: ImageFormat::Jpeg
            }
        );
    }

    #[test]
    fn test_derivative_names_are_never_eligible() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("leaf.JPG");
        for kind in AugmentationKind::ALL {
            let derived = kind.output_path(&source, None);
            write_image(&derived, ImageFormat::Jpeg);
            assert!(!filter().is_eligible(&derived), "{}", derived.display());
            assert_eq!(
                filter().check(&derived),
                Eligibility::Rejected(Rejection::AlreadyDerived {
                    suffix: kind.suffix().to_string()
                })
            );
        }
    }

    #[test]
    fn test_png_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        write_image(&path, ImageFormat::Png);

        assert_eq!(
            filter().check(&path),
            Eligibility::Rejected(Rejection::UnsupportedFormat {
                format: "png".to_string()
            })
        );
    }

    #[test]
    fn test_extension_is_not_trusted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.jpg");
        write_image(&path, ImageFormat::Png);
        assert!(!filter().is_eligible(&path));

        let real = dir.path().join("real.png");
        write_image(&real, ImageFormat::Jpeg);
        assert!(filter().is_eligible(&real));
    }

    #[test]
    fn test_missing_and_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            filter().check(&dir.path().join("missing.JPG")),
            Eligibility::Rejected(Rejection::NotFound)
        );
        assert_eq!(
            filter().check(dir.path()),
            Eligibility::Rejected(Rejection::NotAFile)
        );
    }

    #[test]
    fn test_truncated_jpeg_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.JPG");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

        let result = filter().check(&path);
        assert!(matches!(
            result,
            Eligibility::Rejected(Rejection::Unreadable { .. })
        ));
    }

    #[test]
    fn test_huge_size_limit_does_not_overflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.JPG");
        write_image(&path, ImageFormat::Jpeg);

        let filter = EligibilityFilter::new(LimitsConfig {
            max_file_size_mb: u64::MAX,
            ..LimitsConfig::default()
        });
        assert!(filter.is_eligible(&path));
    }

    #[test]
    fn test_severity() {
        let derived = Rejection::AlreadyDerived {
            suffix: "_rotated".to_string(),
        };
        assert_eq!(derived.severity(), Severity::Skip);
        assert_eq!(Rejection::NotFound.severity(), Severity::Failure);
    }
}
