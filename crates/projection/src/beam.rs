//! Radar beam propagation geometry.
//!
//! Standard refraction is modelled with the 4/3 effective earth radius: the
//! beam is treated as a straight line over a sphere of radius `4/3·R`.

use crate::azimuthal::EARTH_RADIUS_M;

/// Effective earth radius multiplier under standard refraction.
pub const EFFECTIVE_RADIUS_FACTOR: f64 = 4.0 / 3.0;

/// Beam geometry for a single elevation angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamGeometry {
    elevation_rad: f64,
    effective_radius: f64,
}

impl BeamGeometry {
    /// Geometry for a beam at `elevation_deg` above the horizon.
    pub fn new(elevation_deg: f64) -> Self {
        Self {
            elevation_rad: elevation_deg.to_radians(),
            effective_radius: EFFECTIVE_RADIUS_FACTOR * EARTH_RADIUS_M,
        }
    }

    /// Beam height above the antenna (metres) at a slant range.
    pub fn height(&self, slant_range_m: f64) -> f64 {
        let re = self.effective_radius;
        (slant_range_m * slant_range_m
            + re * re
            + 2.0 * slant_range_m * re * self.elevation_rad.sin())
        .sqrt()
            - re
    }

    /// Great-circle distance (metres) from the radar to the point below the
    /// beam at a slant range.
    pub fn ground_distance(&self, slant_range_m: f64) -> f64 {
        let re = self.effective_radius;
        let h = self.height(slant_range_m);
        let arg = (slant_range_m * self.elevation_rad.cos() / (re + h)).clamp(-1.0, 1.0);
        re * arg.asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_range() {
        let beam = BeamGeometry::new(0.5);
        assert!(beam.height(0.0).abs() < 1e-6);
        assert!(beam.ground_distance(0.0).abs() < 1e-6);
    }

    #[test]
    fn test_horizontal_beam_rises_with_range() {
        let beam = BeamGeometry::new(0.0);
        // About 588 m at 100 km under 4/3 refraction
        let h = beam.height(100_000.0);
        assert!((h - 588.0).abs() < 2.0, "height was {h}");
        assert!(beam.ground_distance(100_000.0) < 100_000.0);
    }

    #[test]
    fn test_steep_beam_covers_less_ground() {
        let low = BeamGeometry::new(0.5).ground_distance(50_000.0);
        let high = BeamGeometry::new(19.5).ground_distance(50_000.0);
        assert!(high < low);
        assert!((high - 50_000.0 * 19.5_f64.to_radians().cos()).abs() < 500.0);
    }
}
