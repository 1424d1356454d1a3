//! The display seam the controller drives.

use radar_common::{GeoExtent, GeoPoint};

/// A position in screen pixels, origin top-left, `y` down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rendered map whose visible extent can be read and replaced.
pub trait MapSurface {
    /// Currently displayed extent.
    fn extent(&self) -> GeoExtent;

    /// Replace the displayed extent. Takes effect on the next redraw.
    fn set_extent(&mut self, extent: GeoExtent);

    /// Whether a screen point lies over the map area.
    fn contains(&self, point: ScreenPoint) -> bool;

    /// Inverse-project a screen point as if the map were showing `extent`.
    ///
    /// `None` when the point has no geographic position (outside the
    /// projection's domain).
    fn geographic_at(&self, point: ScreenPoint, extent: &GeoExtent) -> Option<GeoPoint>;

    fn request_redraw(&mut self);
}

/// Plate carrée surface: longitude and latitude map linearly onto a pixel
/// rectangle. Used where no real projection is involved.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSurface {
    pub extent: GeoExtent,
    /// Map area origin and size in pixels
    pub origin: ScreenPoint,
    pub width: f64,
    pub height: f64,
    pub redraws: usize,
}

impl LinearSurface {
    pub fn new(extent: GeoExtent, width: f64, height: f64) -> Self {
        Self {
            extent,
            origin: ScreenPoint::new(0.0, 0.0),
            width,
            height,
            redraws: 0,
        }
    }

    /// Screen position of a geographic point under the current extent.
    pub fn screen_at(&self, point: GeoPoint) -> ScreenPoint {
        let e = &self.extent;
        ScreenPoint::new(
            self.origin.x + (point.lon - e.lon_min) / e.lon_span() * self.width,
            self.origin.y + (e.lat_max - point.lat) / e.lat_span() * self.height,
        )
    }
}

impl MapSurface for LinearSurface {
    fn extent(&self) -> GeoExtent {
        self.extent
    }

    fn set_extent(&mut self, extent: GeoExtent) {
        self.extent = extent;
    }

    fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.width
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.height
    }

    fn geographic_at(&self, point: ScreenPoint, extent: &GeoExtent) -> Option<GeoPoint> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        let fx = (point.x - self.origin.x) / self.width;
        let fy = (point.y - self.origin.y) / self.height;
        Some(GeoPoint::new(
            extent.lon_min + fx * extent.lon_span(),
            extent.lat_max - fy * extent.lat_span(),
        ))
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_surface_round_trip() {
        let extent = GeoExtent::new(110.0, 116.0, 20.0, 26.0).unwrap();
        let surface = LinearSurface::new(extent, 600.0, 600.0);
        let geo = surface
            .geographic_at(ScreenPoint::new(150.0, 450.0), &extent)
            .unwrap();
        assert!((geo.lon - 111.5).abs() < 1e-12);
        assert!((geo.lat - 21.5).abs() < 1e-12);
        let back = surface.screen_at(geo);
        assert!((back.x - 150.0).abs() < 1e-9 && (back.y - 450.0).abs() < 1e-9);
    }
}
