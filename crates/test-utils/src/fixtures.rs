//! Common test fixtures for radar viewer tests.
//!
//! This module provides pre-defined sites and extents that represent common
//! scenarios when viewing radar data.

/// Radar sites as `(code, name, lon, lat)`.
pub mod site {
    pub const GUANGZHOU: (&str, &str, f64, f64) = ("Z9200", "Guangzhou", 113.355, 23.004);
}

/// Common extents as `(lon_min, lon_max, lat_min, lat_max)`.
pub mod extent {
    /// Roughly 75 km around the Guangzhou radar
    pub const GUANGZHOU_75KM: (f64, f64, f64, f64) = (112.62, 114.09, 22.33, 23.68);

    /// A view touching the north-east corner of the world
    pub const NORTH_EAST_CORNER: (f64, f64, f64, f64) = (170.0, 180.0, 80.0, 90.0);
}

/// Common sweep sizes as `(radials, gates)`.
pub mod sweep {
    /// The `(2, 10)` shape used for attenuation checks
    pub const ATTENUATION: (usize, usize) = (2, 10);
}
