//! Decoding tests against synthetic standard-format volumes.

use radar_common::{ErrorKind, Product, RadarError};
use radar_io::{ScanError, ScanLoader, StandardFormatLoader};
use test_utils::{assert_approx_eq, assert_slice_approx_eq, SyntheticVolume, Wrapping};

// ============================================================================
// Round trips
// ============================================================================

fn check_volume(wrapping: Wrapping) {
    let volume = SyntheticVolume::two_tilt(36, 40);
    let bytes = volume.to_wrapped_bytes(wrapping).unwrap();
    let scan = StandardFormatLoader::new().load_bytes(bytes).unwrap();

    assert_eq!(scan.site.code, "Z9200");
    assert_eq!(scan.site.name, "Guangzhou");
    assert_approx_eq!(scan.site.longitude, 113.355, 1e-4);
    assert_approx_eq!(scan.site.latitude, 23.004, 1e-4);
    assert_eq!(scan.task_name, "VCP21D");
    assert_eq!(scan.scan_time.timestamp(), 1_688_000_000);

    assert_eq!(scan.tilt_count(), 2);
    let elevations = scan.elevation_angles();
    assert_approx_eq!(elevations[0], 0.5, 1e-6);
    assert_approx_eq!(elevations[1], 1.5, 1e-6);

    assert_eq!(
        scan.available_products(0),
        vec![Product::Ref, Product::Vel, Product::Sw]
    );
    assert_eq!(scan.available_products(1), vec![Product::Vel]);
    assert!(scan.available_products(2).is_empty());

    // Reflectivity is quantised to 0.5 dB
    let expected = &volume.cuts[0].moments[0].values;
    let decoded = &scan.tilts[0].moments[&Product::Ref].data;
    assert_eq!(decoded.shape(), (36, 40));
    assert_slice_approx_eq!(decoded.as_slice(), expected.as_slice(), 0.25);
}

#[test]
fn test_raw_round_trip() {
    check_volume(Wrapping::Raw);
}

#[test]
fn test_gzip_round_trip() {
    check_volume(Wrapping::Gzip);
}

#[test]
fn test_bzip2_round_trip() {
    check_volume(Wrapping::Bzip2);
}

#[test]
fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = SyntheticVolume::two_tilt(8, 10)
        .write_to(dir.path(), "Z9200.bin.bz2", Wrapping::Bzip2)
        .unwrap();
    let scan = StandardFormatLoader::new().load(&path).unwrap();
    assert_eq!(scan.tilts[0].radial_count(), 8);
}

// ============================================================================
// Gate spacing and sweeps
// ============================================================================

#[test]
fn test_doppler_spacing_used_for_velocity() {
    let bytes = SyntheticVolume::two_tilt(8, 10).to_bytes();
    let scan = StandardFormatLoader::new().load_bytes(bytes).unwrap();
    assert_eq!(scan.tilts[0].moments[&Product::Ref].gate_spacing_m, 1000.0);
    assert_eq!(scan.tilts[1].moments[&Product::Vel].gate_spacing_m, 250.0);
}

#[test]
fn test_sweep_geometry() {
    let bytes = SyntheticVolume::two_tilt(36, 40).to_bytes();
    let scan = StandardFormatLoader::new().load_bytes(bytes).unwrap();
    let sweep = scan.sweep(0, 30.0, Product::Ref).unwrap();

    assert_eq!(sweep.shape(), (36, 30));
    assert_eq!(sweep.longitude.shape(), (36, 30));
    assert_approx_eq!(sweep.slant_ranges_m[0], 500.0, 1e-9);
    assert!(sweep.ground_distances_m[29] < sweep.slant_ranges_m[29]);

    // First radial points (almost) due north
    assert!(sweep.latitude[(0, 29)] > 23.004);
    assert_approx_eq!(sweep.longitude[(0, 29)], 113.355, 0.05);

    let extent = sweep.extent().unwrap();
    assert!(extent.lon_min < 113.355 && extent.lon_max > 113.355);
    assert!(extent.lat_span() > 0.5 && extent.lat_span() < 0.6);
}

#[test]
fn test_same_range_same_shape_across_products() {
    let bytes = SyntheticVolume::two_tilt(36, 40).to_bytes();
    let scan = StandardFormatLoader::new().load_bytes(bytes).unwrap();
    let reflectivity = scan.sweep(0, 25.0, Product::Ref).unwrap();
    let velocity = scan.sweep(0, 25.0, Product::Vel).unwrap();
    let width = scan.sweep(0, 25.0, Product::Sw).unwrap();
    assert_eq!(reflectivity.shape(), velocity.shape());
    assert_eq!(velocity.shape(), width.shape());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_bad_magic_is_file_format_error() {
    let mut bytes = SyntheticVolume::two_tilt(4, 4).to_bytes();
    bytes[0] = b'X';
    let err = StandardFormatLoader::new().load_bytes(bytes).unwrap_err();
    assert!(matches!(err, ScanError::InvalidFormat(_)));
    assert_eq!(RadarError::from(err).kind(), ErrorKind::FileFormat);
}

#[test]
fn test_truncated_radial_is_file_format_error() {
    let mut bytes = SyntheticVolume::two_tilt(4, 4).to_bytes();
    bytes.truncate(bytes.len() - 3);
    let err = StandardFormatLoader::new().load_bytes(bytes).unwrap_err();
    assert!(matches!(err, ScanError::Truncated { what: "moment data", .. }));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = StandardFormatLoader::new()
        .load(std::path::Path::new("/nonexistent/radar.bin"))
        .unwrap_err();
    assert!(matches!(err, ScanError::Io(_)));
}

#[test]
fn test_unknown_moment_codes_skipped() {
    let mut volume = SyntheticVolume::two_tilt(4, 4);
    volume.cuts[1].moments[0].code = 42;
    let scan = StandardFormatLoader::new().load_bytes(volume.to_bytes()).unwrap();
    assert!(scan.available_products(1).is_empty());
    assert_eq!(scan.tilts[1].radial_count(), 4);
}

// ============================================================================
// Recorded data
// ============================================================================

#[test]
fn test_recorded_volume() {
    let path = test_utils::require_test_file!("Z_RADR_I_Z9200_20230101000000_O_DOR_SA_CAP_FMT.bin.bz2");
    let scan = StandardFormatLoader::new().load(&path).unwrap();
    assert_eq!(scan.site.code, "Z9200");
    assert!(scan.tilt_count() > 0);

    let (_, _, lon, lat) = test_utils::fixtures::site::GUANGZHOU;
    assert_approx_eq!(scan.site.longitude, lon, 0.01);
    assert_approx_eq!(scan.site.latitude, lat, 0.01);

    let sweep = scan.sweep(0, 75.0, Product::Ref).unwrap();
    assert_eq!(sweep.shape().0, scan.tilts[0].radial_count());
}
