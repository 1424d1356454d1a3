//! Ordered navigation over a folder of radar files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ScanError, ScanResult};

/// Extension of files picked up in folder mode.
pub const SEQUENCE_EXTENSION: &str = "bz2";

/// A lexicographically sorted list of files with a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSequence {
    files: Vec<PathBuf>,
    position: usize,
}

impl FileSequence {
    /// Collect every `.bz2` file directly inside `dir` (no recursion).
    pub fn from_dir(dir: &Path) -> ScanResult<Self> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => ScanError::Io(io),
                None => ScanError::invalid_format("filesystem loop"),
            })?;
            let is_match = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case(SEQUENCE_EXTENSION))
                    .unwrap_or(false);
            if is_match {
                files.push(entry.into_path());
            }
        }
        tracing::info!(dir = %dir.display(), files = files.len(), "Scanned folder");
        Self::from_files(files).ok_or_else(|| ScanError::EmptySequence(dir.to_path_buf()))
    }

    /// Sort the given paths; `None` when empty.
    pub fn from_files(mut files: Vec<PathBuf>) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        files.sort();
        Some(Self { files, position: 0 })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Zero-based cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> &Path {
        &self.files[self.position]
    }

    /// Advance the cursor. Past the last file this is a no-op returning `None`.
    pub fn next(&mut self) -> Option<&Path> {
        if self.position + 1 >= self.files.len() {
            return None;
        }
        self.position += 1;
        Some(self.current())
    }

    /// Step back. Before the first file this is a no-op returning `None`.
    pub fn previous(&mut self) -> Option<&Path> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        Some(self.current())
    }

    /// Peek at the neighbour in a direction without moving.
    pub fn peek(&self, forward: bool) -> Option<&Path> {
        if forward {
            self.files.get(self.position + 1).map(PathBuf::as_path)
        } else {
            self.position
                .checked_sub(1)
                .and_then(|i| self.files.get(i))
                .map(PathBuf::as_path)
        }
    }
}
