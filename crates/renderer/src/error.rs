//! Rendering errors.

use radar_common::{GridError, RadarError};
use radar_io::ScanError;
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(transparent)]
    Grid(GridError),

    #[error("Sweep has no valid gate positions")]
    NoExtent,

    #[error("Unknown colormap style: {0}")]
    UnknownStyle(String),

    #[error("Invalid style '{name}': {reason}")]
    InvalidStyle { name: String, reason: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Boundary file error: {0}")]
    Boundary(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GridError> for RenderError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::ShapeMismatch { expected, actual } => {
                RenderError::ShapeMismatch { expected, actual }
            }
            other => RenderError::Grid(other),
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Encode(err.to_string())
    }
}

impl From<RenderError> for RadarError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Scan(e) => e.into(),
            RenderError::ShapeMismatch { expected, actual } => {
                RadarError::ShapeMismatch { expected, actual }
            }
            RenderError::Grid(e) => e.into(),
            RenderError::Io(e) => RadarError::Io(e),
            other => RadarError::render(other.to_string()),
        }
    }
}
