//! Radar base-data reading.
//!
//! This crate decodes single-site radar volumes in the standard base-data
//! format (optionally gzip or bzip2 wrapped) into a [`Scan`], grids a tilt
//! and product into geographic arrays via [`Scan::sweep`], and walks folders
//! of sequential volumes with [`FileSequence`].

pub mod compression;
pub mod error;
pub mod loader;
pub mod scan;
pub mod sequence;
pub mod standard;

pub use compression::Compression;
pub use error::{ScanError, ScanResult};
pub use loader::{ScanLoader, StandardFormatLoader};
pub use scan::{Moment, Scan, Site, SweepData, Tilt};
pub use sequence::FileSequence;
