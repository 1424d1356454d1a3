//! Cursor-anchored zoom.

use radar_common::extent::{LAT_BOUNDS, LON_BOUNDS};
use radar_common::{GeoExtent, GeoPoint};

use crate::config::InteractionConfig;

/// Scale `extent` about `center` by `scale` (< 1 zooms in).
///
/// The point at `center` keeps its relative position in the extent. Spans
/// never drop below the configured minimum and bounds never leave the
/// physical coordinate ranges.
pub fn zoom_extent(
    extent: &GeoExtent,
    center: GeoPoint,
    scale: f64,
    config: &InteractionConfig,
) -> GeoExtent {
    let (lon_min, lon_max) = scale_axis(
        extent.lon_min,
        extent.lon_max,
        center.lon,
        scale,
        config.min_lon_span,
        LON_BOUNDS,
    );
    let (lat_min, lat_max) = scale_axis(
        extent.lat_min,
        extent.lat_max,
        center.lat,
        scale,
        config.min_lat_span,
        LAT_BOUNDS,
    );
    GeoExtent {
        lon_min,
        lon_max,
        lat_min,
        lat_max,
    }
}

fn scale_axis(
    min: f64,
    max: f64,
    center: f64,
    scale: f64,
    floor: f64,
    bounds: (f64, f64),
) -> (f64, f64) {
    let mut new_min = center - (center - min) * scale;
    let mut new_max = center + (max - center) * scale;

    if new_max - new_min < floor {
        new_min = center - floor / 2.0;
        new_max = center + floor / 2.0;
    }

    new_min = new_min.max(bounds.0);
    new_max = new_max.min(bounds.1);

    // Clamping against a bound can eat into the floor; grow away from it.
    if new_max - new_min < floor {
        if new_max >= bounds.1 {
            new_min = bounds.1 - floor;
        } else {
            new_max = new_min + floor;
        }
    }
    (new_min, new_max)
}
