//! Common types shared across the radar viewer crates.

pub mod error;
pub mod extent;
pub mod grid;
pub mod product;

pub use error::{ErrorKind, RadarError, RadarResult};
pub use extent::{ExtentError, GeoExtent, GeoPoint};
pub use grid::{Grid2D, GridError};
pub use product::{Product, ProductParseError};
