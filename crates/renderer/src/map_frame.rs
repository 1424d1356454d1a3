//! Pixel <-> geographic mapping for the plot area.

use projection::{AzimuthalEquidistant, EARTH_RADIUS_M};
use radar_common::{GeoExtent, GeoPoint};

/// Metres per degree of latitude on the projection sphere.
const METRES_PER_DEGREE: f64 = std::f64::consts::PI * EARTH_RADIUS_M / 180.0;

/// Axis-aligned pixel rectangle inside a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlotRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && px <= self.right() as f64
            && py >= self.y as f64
            && py <= self.bottom() as f64
    }
}

/// An azimuthal-equidistant view of a geographic extent drawn into a
/// [`PlotRect`].
///
/// The extent fixes the projected centre and half-widths, so the same extent
/// always yields the same view. The shorter axis is widened to keep metres
/// per pixel equal on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    rect: PlotRect,
    projection: AzimuthalEquidistant,
    extent: GeoExtent,
    center_x: f64,
    center_y: f64,
    metres_per_pixel: f64,
}

impl MapFrame {
    pub fn new(rect: PlotRect, projection: AzimuthalEquidistant, extent: GeoExtent) -> Self {
        let (center_x, center_y, metres_per_pixel) = view_parameters(&rect, &projection, &extent);
        Self {
            rect,
            projection,
            extent,
            center_x,
            center_y,
            metres_per_pixel,
        }
    }

    /// Same rectangle and projection, different extent.
    pub fn with_extent(&self, extent: GeoExtent) -> Self {
        Self::new(self.rect, self.projection, extent)
    }

    pub fn rect(&self) -> PlotRect {
        self.rect
    }

    pub fn extent(&self) -> GeoExtent {
        self.extent
    }

    pub fn projection(&self) -> &AzimuthalEquidistant {
        &self.projection
    }

    pub fn metres_per_pixel(&self) -> f64 {
        self.metres_per_pixel
    }

    pub fn contains_pixel(&self, px: f64, py: f64) -> bool {
        self.rect.contains(px, py)
    }

    /// Projected coordinates (metres from the radar) of a figure pixel.
    pub fn pixel_to_projected(&self, px: f64, py: f64) -> (f64, f64) {
        let cx = self.rect.x as f64 + self.rect.width as f64 / 2.0;
        let cy = self.rect.y as f64 + self.rect.height as f64 / 2.0;
        (
            self.center_x + (px - cx) * self.metres_per_pixel,
            self.center_y - (py - cy) * self.metres_per_pixel,
        )
    }

    pub fn projected_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let cx = self.rect.x as f64 + self.rect.width as f64 / 2.0;
        let cy = self.rect.y as f64 + self.rect.height as f64 / 2.0;
        (
            cx + (x - self.center_x) / self.metres_per_pixel,
            cy - (y - self.center_y) / self.metres_per_pixel,
        )
    }

    pub fn pixel_to_geo(&self, px: f64, py: f64) -> Option<GeoPoint> {
        let (x, y) = self.pixel_to_projected(px, py);
        self.projection
            .inverse(x, y)
            .map(|(lon, lat)| GeoPoint::new(lon, lat))
    }

    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        self.projection
            .forward(lon, lat)
            .map(|(x, y)| self.projected_to_pixel(x, y))
    }

    /// Inverse-project a figure pixel as if this frame showed `extent`.
    pub fn geographic_at(&self, px: f64, py: f64, extent: &GeoExtent) -> Option<GeoPoint> {
        if !px.is_finite() || !py.is_finite() {
            return None;
        }
        if extent == &self.extent {
            return self.pixel_to_geo(px, py);
        }
        self.with_extent(*extent).pixel_to_geo(px, py)
    }
}

fn view_parameters(
    rect: &PlotRect,
    projection: &AzimuthalEquidistant,
    extent: &GeoExtent,
) -> (f64, f64, f64) {
    let center = extent.center();
    let (center_x, center_y) = projection
        .forward(center.lon, center.lat)
        .unwrap_or((0.0, 0.0));

    let half_w = extent.lon_span() / 2.0 * METRES_PER_DEGREE * center.lat.to_radians().cos().abs();
    let half_h = extent.lat_span() / 2.0 * METRES_PER_DEGREE;

    let width = rect.width.max(1) as f64;
    let height = rect.height.max(1) as f64;
    let metres_per_pixel = (2.0 * half_w / width).max(2.0 * half_h / height);
    // Degenerate extents still need a usable scale
    let metres_per_pixel = if metres_per_pixel.is_finite() && metres_per_pixel > 0.0 {
        metres_per_pixel
    } else {
        1.0
    };

    (center_x, center_y, metres_per_pixel)
}
