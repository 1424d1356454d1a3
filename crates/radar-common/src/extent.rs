//! Geographic extent types and operations.

use serde::{Deserialize, Serialize};

/// Physical longitude range in degrees.
pub const LON_BOUNDS: (f64, f64) = (-180.0, 180.0);

/// Physical latitude range in degrees.
pub const LAT_BOUNDS: (f64, f64) = (-90.0, 90.0);

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// The visible geographic bounding box of a map view.
///
/// Field order follows the `(lon_min, lon_max, lat_min, lat_max)` convention
/// used by map extents, not the `(min_x, min_y, max_x, max_y)` order of WMS
/// bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoExtent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GeoExtent {
    /// Create an extent, rejecting non-finite or inverted bounds.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Result<Self, ExtentError> {
        let extent = Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        };
        extent.validate()?;
        Ok(extent)
    }

    /// Smallest extent enclosing every finite point, or `None` when there is
    /// no finite point or the points are degenerate along an axis.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut lon_min = f64::INFINITY;
        let mut lon_max = f64::NEG_INFINITY;
        let mut lat_min = f64::INFINITY;
        let mut lat_max = f64::NEG_INFINITY;

        for p in points.into_iter().filter(GeoPoint::is_finite) {
            lon_min = lon_min.min(p.lon);
            lon_max = lon_max.max(p.lon);
            lat_min = lat_min.min(p.lat);
            lat_max = lat_max.max(p.lat);
        }

        Self::new(lon_min, lon_max, lat_min, lat_max).ok()
    }

    /// Check the ordering invariant.
    pub fn validate(&self) -> Result<(), ExtentError> {
        let values = [self.lon_min, self.lon_max, self.lat_min, self.lat_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ExtentError::NonFinite(*self));
        }
        if self.lon_min >= self.lon_max {
            return Err(ExtentError::Inverted {
                axis: "longitude",
                min: self.lon_min,
                max: self.lon_max,
            });
        }
        if self.lat_min >= self.lat_max {
            return Err(ExtentError::Inverted {
                axis: "latitude",
                min: self.lat_min,
                max: self.lat_max,
            });
        }
        Ok(())
    }

    /// Longitude span in degrees.
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// Check if a point is contained within this extent.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.lon_min
            && point.lon <= self.lon_max
            && point.lat >= self.lat_min
            && point.lat <= self.lat_max
    }

    /// Move all four bounds by the given deltas.
    pub fn translated(&self, dlon: f64, dlat: f64) -> Self {
        Self {
            lon_min: self.lon_min + dlon,
            lon_max: self.lon_max + dlon,
            lat_min: self.lat_min + dlat,
            lat_max: self.lat_max + dlat,
        }
    }

    /// Clamp each bound independently to the physical coordinate ranges.
    pub fn clamped(&self) -> Self {
        Self {
            lon_min: self.lon_min.max(LON_BOUNDS.0),
            lon_max: self.lon_max.min(LON_BOUNDS.1),
            lat_min: self.lat_min.max(LAT_BOUNDS.0),
            lat_max: self.lat_max.min(LAT_BOUNDS.1),
        }
    }

    /// Shift the extent back inside the physical ranges, keeping its spans.
    ///
    /// A span wider than the physical range is clamped instead.
    pub fn shifted_within_bounds(&self) -> Self {
        let (lon_min, lon_max) = shift_axis(self.lon_min, self.lon_max, LON_BOUNDS);
        let (lat_min, lat_max) = shift_axis(self.lat_min, self.lat_max, LAT_BOUNDS);
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Approximate equality of all four bounds.
    pub fn approx_eq(&self, other: &GeoExtent, tolerance: f64) -> bool {
        (self.lon_min - other.lon_min).abs() <= tolerance
            && (self.lon_max - other.lon_max).abs() <= tolerance
            && (self.lat_min - other.lat_min).abs() <= tolerance
            && (self.lat_max - other.lat_max).abs() <= tolerance
    }

    /// Bounds as `[lon_min, lon_max, lat_min, lat_max]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.lon_min, self.lon_max, self.lat_min, self.lat_max]
    }
}

fn shift_axis(min: f64, max: f64, bounds: (f64, f64)) -> (f64, f64) {
    let span = max - min;
    if span >= bounds.1 - bounds.0 {
        return (min.max(bounds.0), max.min(bounds.1));
    }
    if min < bounds.0 {
        (bounds.0, bounds.0 + span)
    } else if max > bounds.1 {
        (bounds.1 - span, bounds.1)
    } else {
        (min, max)
    }
}

impl std::fmt::Display for GeoExtent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}] x [{:.4}, {:.4}]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtentError {
    #[error("Extent has non-finite bounds: {0}")]
    NonFinite(GeoExtent),

    #[error("Inverted {axis} bounds: min {min} is not below max {max}")]
    Inverted {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_inverted() {
        assert!(GeoExtent::new(10.0, 5.0, 0.0, 1.0).is_err());
        assert!(GeoExtent::new(0.0, 1.0, 3.0, 3.0).is_err());
        assert!(GeoExtent::new(0.0, f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_shifted_within_bounds_keeps_span() {
        let extent = GeoExtent::new(175.0, 185.0, 80.0, 95.0).unwrap();
        let shifted = extent.shifted_within_bounds();
        assert_eq!(shifted.lon_max, 180.0);
        assert!((shifted.lon_span() - 10.0).abs() < 1e-12);
        assert_eq!(shifted.lat_max, 90.0);
        assert!((shifted.lat_span() - 15.0).abs() < 1e-12);
    }
}
