//! Error types shared by the radar viewer crates.

use thiserror::Error;

use crate::grid::GridError;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Which dialog category a failure is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The file did not decode to a radar volume.
    FileFormat,
    /// The user asked for something the current state cannot satisfy.
    UserInput,
    /// Plotting, filtering or exporting failed.
    Render,
}

/// Primary error type surfaced to the user.
#[derive(Debug, Error)]
pub enum RadarError {
    // === File Errors ===
    #[error("Cannot read radar file: {0}")]
    FileFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Input Errors ===
    #[error("{0}")]
    UserInput(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    // === Rendering Errors ===
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Rendering failed: {0}")]
    Render(String),
}

impl RadarError {
    /// Create a file-format error.
    pub fn file_format(msg: impl Into<String>) -> Self {
        Self::FileFormat(msg.into())
    }

    /// Create a user-input error.
    pub fn user_input(msg: impl Into<String>) -> Self {
        Self::UserInput(msg.into())
    }

    /// Create a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Get the dialog category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RadarError::FileFormat(_) | RadarError::Io(_) => ErrorKind::FileFormat,
            RadarError::UserInput(_) | RadarError::InvalidRange(_) => ErrorKind::UserInput,
            RadarError::DataNotAvailable(_)
            | RadarError::ShapeMismatch { .. }
            | RadarError::Render(_) => ErrorKind::Render,
        }
    }

    /// Title shown on the message dialog.
    pub fn dialog_title(&self) -> &'static str {
        match self.kind() {
            ErrorKind::FileFormat => "Error reading file",
            ErrorKind::UserInput => "Warning",
            ErrorKind::Render => "Plot error",
        }
    }

    /// Input mistakes are reported as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        self.kind() == ErrorKind::UserInput
    }
}

impl From<GridError> for RadarError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::ShapeMismatch { expected, actual } => {
                RadarError::ShapeMismatch { expected, actual }
            }
            other => RadarError::Render(other.to_string()),
        }
    }
}
