//! Azimuthal Equidistant projection.
//!
//! Distances and azimuths measured from the projection centre are preserved,
//! which makes this the natural plane for a radar sweep: a gate at azimuth
//! `a` and ground distance `d` lands at `(d·sin a, d·cos a)`.
//!
//! The spherical form is used. Plane coordinates are metres east (`x`) and
//! north (`y`) of the centre.

use std::f64::consts::PI;

use radar_common::GeoPoint;

/// Mean earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Azimuthal Equidistant projection centred on a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthalEquidistant {
    /// Centre longitude in degrees
    pub lon0: f64,
    /// Centre latitude in degrees
    pub lat0: f64,
    /// Sphere radius in metres
    pub radius: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl AzimuthalEquidistant {
    /// Create a projection centred on `(lon0, lat0)` in degrees.
    pub fn new(lon0: f64, lat0: f64) -> Self {
        Self::with_radius(lon0, lat0, EARTH_RADIUS_M)
    }

    /// Create a projection on a sphere of the given radius.
    ///
    /// # Arguments
    /// * `lon0` - Centre longitude (degrees)
    /// * `lat0` - Centre latitude (degrees)
    /// * `radius` - Sphere radius (metres)
    pub fn with_radius(lon0: f64, lat0: f64, radius: f64) -> Self {
        let phi0 = lat0.to_radians();
        Self {
            lon0,
            lat0,
            radius,
            sin_lat0: phi0.sin(),
            cos_lat0: phi0.cos(),
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lon0, self.lat0)
    }

    /// Project geographic coordinates (degrees) to plane metres.
    ///
    /// Returns `None` for non-finite input and for the antipode, where the
    /// projection is undefined.
    pub fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let phi = lat.to_radians();
        let dlon = (lon - self.lon0).to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let cos_dlon = dlon.cos();

        let cos_c = (self.sin_lat0 * sin_phi + self.cos_lat0 * cos_phi * cos_dlon).clamp(-1.0, 1.0);
        let c = cos_c.acos();
        if (PI - c).abs() < 1e-12 {
            return None;
        }
        let k = if c.abs() < 1e-12 { 1.0 } else { c / c.sin() };

        let x = self.radius * k * cos_phi * dlon.sin();
        let y = self.radius * k * (self.cos_lat0 * sin_phi - self.sin_lat0 * cos_phi * cos_dlon);
        Some((x, y))
    }

    /// Inverse-project plane metres to geographic coordinates (degrees).
    ///
    /// Returns `None` outside the projection disc (radius `π·R`).
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let rho = x.hypot(y);
        if rho < 1e-9 {
            return Some((self.lon0, self.lat0));
        }
        let c = rho / self.radius;
        if c > PI {
            return None;
        }
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_lat0 + y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let dlon = (x * sin_c).atan2(rho * self.cos_lat0 * cos_c - y * self.sin_lat0 * sin_c);

        Some((normalize_lon(self.lon0 + dlon.to_degrees()), lat.to_degrees()))
    }

    /// Geographic position of a point at `azimuth_deg` (clockwise from north)
    /// and `distance_m` along the ground from the centre.
    pub fn polar_to_geo(&self, azimuth_deg: f64, distance_m: f64) -> Option<GeoPoint> {
        let az = azimuth_deg.to_radians();
        self.inverse(distance_m * az.sin(), distance_m * az.cos())
            .map(|(lon, lat)| GeoPoint::new(lon, lat))
    }

    /// Azimuth (degrees in `[0, 360)`) and ground distance (metres) of a
    /// geographic point as seen from the centre.
    pub fn geo_to_polar(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (x, y) = self.forward(lon, lat)?;
        Some((plane_azimuth(x, y), x.hypot(y)))
    }
}

/// Azimuth in degrees `[0, 360)` of a plane offset, clockwise from north.
pub fn plane_azimuth(x: f64, y: f64) -> f64 {
    let az = x.atan2(y).to_degrees();
    if az < 0.0 {
        az + 360.0
    } else {
        az
    }
}

/// Wrap a longitude into `[-180, 180]`.
pub fn normalize_lon(lon: f64) -> f64 {
    let mut lon = lon;
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}
