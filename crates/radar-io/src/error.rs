//! Error types for radar file decoding.

use std::path::PathBuf;

use radar_common::{Product, RadarError};
use thiserror::Error;

/// Result type for radar I/O operations.
pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// gzip or bzip2 stream could not be inflated
    #[error("Decompression failed: {0}")]
    Decompress(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Truncated {what}: need {needed} bytes, {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Tilt {tilt} out of range (volume has {count} tilts)")]
    TiltOutOfRange { tilt: usize, count: usize },

    #[error("Product {product} not available at tilt {tilt}")]
    ProductUnavailable { product: Product, tilt: usize },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("No .bz2 files found in {0}")]
    EmptySequence(PathBuf),
}

impl ScanError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

impl From<ScanError> for RadarError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Io(e) => RadarError::Io(e),
            ScanError::Decompress(_)
            | ScanError::InvalidFormat(_)
            | ScanError::Truncated { .. } => RadarError::FileFormat(err.to_string()),
            ScanError::TiltOutOfRange { .. } | ScanError::ProductUnavailable { .. } => {
                RadarError::DataNotAvailable(err.to_string())
            }
            ScanError::InvalidRange(_) => RadarError::Render(err.to_string()),
            ScanError::EmptySequence(_) => RadarError::UserInput(err.to_string()),
        }
    }
}
