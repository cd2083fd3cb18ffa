//! Error types for the detection-eval library.

use thiserror::Error;

/// Result type for detection-eval operations.
pub type Result<T> = std::result::Result<T, DetectionEvalError>;

/// Error types that can occur while preparing or evaluating detections.
#[derive(Error, Debug)]
pub enum DetectionEvalError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A label line or predicted box that cannot be turned into a box.
    #[error("Malformed annotation: {0}")]
    MalformedAnnotation(String),

    /// Box coordinates violating `min <= max`.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Zero-sized image used for denormalization or scaling.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },

    /// Threshold outside of [0.0, 1.0].
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Configuration value that cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
