//! Compression detection for radar base-data files.
//!
//! Files arrive raw, gzip-wrapped or bzip2-wrapped. The wrapper is detected
//! from magic bytes rather than the file extension.

use std::io::Read;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;

use crate::error::{ScanError, ScanResult};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZIP2_MAGIC: &[u8; 3] = b"BZh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl Compression {
    /// Detect the wrapper from the first bytes of a file.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else if data.starts_with(BZIP2_MAGIC) {
            Compression::Bzip2
        } else {
            Compression::None
        }
    }
}

/// Strip any compression wrapper, returning the raw base data.
pub fn decompress(data: Vec<u8>) -> ScanResult<Vec<u8>> {
    let compression = Compression::detect(&data);
    let mut out = Vec::with_capacity(data.len() * 4);
    match compression {
        Compression::None => return Ok(data),
        Compression::Gzip => {
            MultiGzDecoder::new(data.as_slice())
                .read_to_end(&mut out)
                .map_err(|e| ScanError::Decompress(format!("gzip: {}", e)))?;
        }
        Compression::Bzip2 => {
            MultiBzDecoder::new(data.as_slice())
                .read_to_end(&mut out)
                .map_err(|e| ScanError::Decompress(format!("bzip2: {}", e)))?;
        }
    }
    tracing::debug!(
        compression = ?compression,
        compressed = data.len(),
        decompressed = out.len(),
        "Decompressed radar file"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect() {
        assert_eq!(Compression::detect(&[0x1F, 0x8B, 8, 0]), Compression::Gzip);
        assert_eq!(Compression::detect(b"BZh91AY"), Compression::Bzip2);
        assert_eq!(Compression::detect(b"RSTM"), Compression::None);
        assert_eq!(Compression::detect(&[]), Compression::None);
    }

    #[test]
    fn test_gzip_round_trip() {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"radar payload").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(decompress(compressed).unwrap(), b"radar payload");
    }

    #[test]
    fn test_corrupt_bzip2() {
        let err = decompress(b"BZh9 definitely not bzip2".to_vec()).unwrap_err();
        assert!(matches!(err, ScanError::Decompress(_)));
    }
}
