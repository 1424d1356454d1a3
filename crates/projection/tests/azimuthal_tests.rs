//! Tests for the azimuthal-equidistant projection and beam geometry.

use projection::azimuthal::{normalize_lon, plane_azimuth};
use projection::{AzimuthalEquidistant, BeamGeometry};
use test_utils::{assert_approx_eq, assert_coords_approx_eq};

// ============================================================================
// Round-trip accuracy
// ============================================================================

#[test]
fn test_forward_inverse_near_radar() {
    let proj = AzimuthalEquidistant::new(113.355, 23.004);
    for &(lon, lat) in &[(113.0, 23.5), (114.1, 22.3), (112.6, 23.9), (113.355, 24.0)] {
        let (x, y) = proj.forward(lon, lat).unwrap();
        let (lon2, lat2) = proj.inverse(x, y).unwrap();
        assert_coords_approx_eq!((lon2, lat2), (lon, lat), 1e-9);
    }
}

#[test]
fn test_forward_inverse_high_latitude() {
    let proj = AzimuthalEquidistant::new(-40.0, 72.0);
    let (x, y) = proj.forward(-10.0, 80.0).unwrap();
    let (lon, lat) = proj.inverse(x, y).unwrap();
    assert_coords_approx_eq!((lon, lat), (-10.0, 80.0), 1e-9);
}

#[test]
fn test_inverse_across_dateline() {
    let proj = AzimuthalEquidistant::new(179.5, 0.0);
    let p = proj.polar_to_geo(90.0, 111_000.0).unwrap();
    assert!(p.lon < -179.0, "lon was {}", p.lon);
}

// ============================================================================
// Distance and azimuth preservation
// ============================================================================

#[test]
fn test_polar_round_trip() {
    let proj = AzimuthalEquidistant::new(116.47, 39.81);
    for az in [0.0, 45.0, 137.5, 270.0, 359.0] {
        let p = proj.polar_to_geo(az, 75_000.0).unwrap();
        let (az2, dist) = proj.geo_to_polar(p.lon, p.lat).unwrap();
        assert_approx_eq!(az2, az, 1e-6);
        assert_approx_eq!(dist, 75_000.0, 1e-3);
    }
}

#[test]
fn test_due_east_keeps_latitude_close() {
    let proj = AzimuthalEquidistant::new(113.0, 23.0);
    let p = proj.polar_to_geo(90.0, 10_000.0).unwrap();
    assert!(p.lon > 113.0);
    assert_approx_eq!(p.lat, 23.0, 0.01);
}

#[test]
fn test_plane_azimuth_wraps() {
    assert_approx_eq!(plane_azimuth(-1.0, 1.0), 315.0, 1e-9);
}

#[test]
fn test_normalize_lon() {
    assert_approx_eq!(normalize_lon(190.0), -170.0, 1e-12);
    assert_approx_eq!(normalize_lon(-540.0), -180.0, 1e-12);
    assert_approx_eq!(normalize_lon(45.0), 45.0, 1e-12);
}

// ============================================================================
// Beam geometry
// ============================================================================

#[test]
fn test_ground_distance_monotonic() {
    let beam = BeamGeometry::new(1.5);
    let mut previous = -1.0;
    for gate in 0..300 {
        let d = beam.ground_distance(125.0 + gate as f64 * 250.0);
        assert!(d > previous);
        previous = d;
    }
}
