//! Error types for the leafprep pipelines.
//!
//! Errors carry the offending path so batch reports stay actionable. Eligibility
//! rejections are not errors: they live in [`crate::pipeline::eligibility`] as
//! `Rejection` values and are reported as skips.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for leafprep operations.
#[derive(Error, Debug)]
pub enum LeafPrepError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors for augmentation, segmentation and distribution analysis.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Path does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Path exists but is not a regular file
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// Path is missing or is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Content is not in the format required by the operation
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Raster could not be read or decoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Destination could not be written
    #[error("Write error for {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Dataset root has no class subdirectories
    #[error("No subdirectories found in {0}")]
    NoSubdirectories(PathBuf),

    /// Dataset root contains no images at all
    #[error("No images found under {0}")]
    EmptyDataset(PathBuf),
}

/// Convenience type alias for leafprep results.
pub type Result<T> = std::result::Result<T, LeafPrepError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
