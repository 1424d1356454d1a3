//! Loading radar files from disk.

use std::path::Path;

use tracing::{info, instrument};

use crate::compression::decompress;
use crate::error::ScanResult;
use crate::scan::Scan;
use crate::standard;

/// Anything that can turn a file on disk into a decoded volume.
pub trait ScanLoader {
    fn load(&self, path: &Path) -> ScanResult<Scan>;
}

/// Loader for standard-format base data, raw or gzip/bzip2 wrapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormatLoader;

impl StandardFormatLoader {
    pub fn new() -> Self {
        Self
    }

    /// Decode an in-memory file, detecting compression from its magic bytes.
    pub fn load_bytes(&self, data: Vec<u8>) -> ScanResult<Scan> {
        let raw = decompress(data)?;
        standard::decode(&raw)
    }
}

impl ScanLoader for StandardFormatLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> ScanResult<Scan> {
        let data = std::fs::read(path)?;
        let size = data.len();
        let scan = self.load_bytes(data)?;
        info!(
            bytes = size,
            site = %scan.site.code,
            tilts = scan.tilt_count(),
            scan_time = %scan.scan_time,
            "Loaded radar volume"
        );
        Ok(scan)
    }
}
