//! Decoded radar volume model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use projection::{AzimuthalEquidistant, BeamGeometry};
use radar_common::{GeoExtent, GeoPoint, Grid2D, Product};

use crate::error::{ScanError, ScanResult};

/// Radar site metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub code: String,
    pub name: String,
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Antenna height above sea level in metres
    pub antenna_height_m: f64,
    /// Ground height above sea level in metres
    pub ground_height_m: f64,
}

impl Site {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// One product's gate values for every radial of a tilt.
#[derive(Debug, Clone, PartialEq)]
pub struct Moment {
    /// `(radials, gates)`; missing gates are NaN
    pub data: Grid2D,
    pub gate_spacing_m: f64,
    /// Slant range of the leading edge of gate 0
    pub first_gate_m: f64,
}

/// One elevation sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilt {
    /// Elevation angle in degrees
    pub elevation: f64,
    /// Radial azimuths in degrees, in acquisition order
    pub azimuths: Vec<f64>,
    pub moments: BTreeMap<Product, Moment>,
}

impl Tilt {
    pub fn new(elevation: f64, azimuths: Vec<f64>) -> Self {
        Self {
            elevation,
            azimuths,
            moments: BTreeMap::new(),
        }
    }

    /// Attach a moment. Its row count must match the number of radials.
    pub fn with_moment(mut self, product: Product, moment: Moment) -> ScanResult<Self> {
        if moment.data.rows() != self.azimuths.len() {
            return Err(ScanError::invalid_format(format!(
                "{} has {} radials, tilt has {}",
                product,
                moment.data.rows(),
                self.azimuths.len()
            )));
        }
        self.moments.insert(product, moment);
        Ok(self)
    }

    pub fn radial_count(&self) -> usize {
        self.azimuths.len()
    }

    /// Slant range in metres of the far edge of the longest recorded moment.
    pub fn max_reach_m(&self) -> f64 {
        self.moments
            .values()
            .map(|m| m.first_gate_m + m.data.cols() as f64 * m.gate_spacing_m)
            .fold(0.0, f64::max)
    }
}

/// A decoded volume scan. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    pub site: Site,
    pub scan_time: DateTime<Utc>,
    pub task_name: String,
    pub tilts: Vec<Tilt>,
}

/// Gridded geographic arrays for one tilt/product/range request.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepData {
    pub product: Product,
    /// Elevation angle in degrees
    pub elevation: f64,
    pub range_km: f64,
    /// Radar location, the projection centre
    pub center: GeoPoint,
    /// One entry per row, degrees
    pub azimuths: Vec<f64>,
    /// One entry per column, gate centre slant range in metres
    pub slant_ranges_m: Vec<f64>,
    /// One entry per column, gate centre ground distance in metres
    pub ground_distances_m: Vec<f64>,
    pub longitude: Grid2D,
    pub latitude: Grid2D,
    pub values: Grid2D,
}

impl SweepData {
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Bounding box of the gate longitude/latitude grids.
    pub fn extent(&self) -> Option<GeoExtent> {
        let points = self
            .longitude
            .as_slice()
            .iter()
            .zip(self.latitude.as_slice())
            .map(|(&lon, &lat)| GeoPoint::new(lon as f64, lat as f64));
        GeoExtent::from_points(points)
    }
}

impl Scan {
    pub fn tilt_count(&self) -> usize {
        self.tilts.len()
    }

    /// Elevation angle of every tilt, in tilt order.
    pub fn elevation_angles(&self) -> Vec<f64> {
        self.tilts.iter().map(|t| t.elevation).collect()
    }

    /// Products present at a tilt. Empty for an unknown tilt.
    pub fn available_products(&self, tilt: usize) -> Vec<Product> {
        self.tilts
            .get(tilt)
            .map(|t| t.moments.keys().copied().collect())
            .unwrap_or_default()
    }

    fn tilt(&self, tilt: usize) -> ScanResult<&Tilt> {
        self.tilts.get(tilt).ok_or(ScanError::TiltOutOfRange {
            tilt,
            count: self.tilts.len(),
        })
    }

    /// Grid the requested product out to `range_km`.
    ///
    /// The number of gates is `floor((range - first_gate) / spacing)`, with
    /// the range capped at the tilt's furthest recorded gate. Gates beyond
    /// what this moment recorded are NaN, so every product at the same
    /// spacing yields the same shape for a given range.
    pub fn sweep(&self, tilt: usize, range_km: f64, product: Product) -> ScanResult<SweepData> {
        if !range_km.is_finite() || range_km <= 0.0 {
            return Err(ScanError::InvalidRange(format!(
                "range must be a positive number of km, got {}",
                range_km
            )));
        }
        let sweep_tilt = self.tilt(tilt)?;
        let moment = sweep_tilt
            .moments
            .get(&product)
            .ok_or(ScanError::ProductUnavailable { product, tilt })?;

        let spacing = moment.gate_spacing_m;
        let range_m = (range_km * 1000.0).min(sweep_tilt.max_reach_m());
        let gates = ((range_m - moment.first_gate_m) / spacing).floor();
        if !gates.is_finite() || gates < 1.0 {
            return Err(ScanError::InvalidRange(format!(
                "no {} gate lies within {} km",
                product, range_km
            )));
        }
        let gates = gates as usize;
        let radials = sweep_tilt.radial_count();

        let beam = BeamGeometry::new(sweep_tilt.elevation);
        let slant_ranges_m: Vec<f64> = (0..gates)
            .map(|i| moment.first_gate_m + (i as f64 + 0.5) * spacing)
            .collect();
        let ground_distances_m: Vec<f64> =
            slant_ranges_m.iter().map(|&r| beam.ground_distance(r)).collect();

        let proj = AzimuthalEquidistant::new(self.site.longitude, self.site.latitude);
        let mut lon = Vec::with_capacity(radials * gates);
        let mut lat = Vec::with_capacity(radials * gates);
        for &az in &sweep_tilt.azimuths {
            for &d in &ground_distances_m {
                match proj.polar_to_geo(az, d) {
                    Some(p) => {
                        lon.push(p.lon as f32);
                        lat.push(p.lat as f32);
                    }
                    None => {
                        lon.push(f32::NAN);
                        lat.push(f32::NAN);
                    }
                }
            }
        }

        let values = Grid2D::from_fn(radials, gates, |r, g| {
            moment.data.get(r, g).unwrap_or(f32::NAN)
        });

        tracing::debug!(
            tilt = tilt,
            product = %product,
            range_km = range_km,
            radials = radials,
            gates = gates,
            "Gridded sweep"
        );

        Ok(SweepData {
            product,
            elevation: sweep_tilt.elevation,
            range_km,
            center: self.site.location(),
            azimuths: sweep_tilt.azimuths.clone(),
            slant_ranges_m,
            ground_distances_m,
            longitude: grid_or_invalid(radials, gates, lon)?,
            latitude: grid_or_invalid(radials, gates, lat)?,
            values,
        })
    }
}

fn grid_or_invalid(rows: usize, cols: usize, data: Vec<f32>) -> ScanResult<Grid2D> {
    Grid2D::new(rows, cols, data).map_err(|e| ScanError::invalid_format(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // REF records 10 gates and VEL 15, both at 1 km
    fn tiny_scan() -> Scan {
        let data = Grid2D::from_fn(4, 10, |r, g| (r * 10 + g) as f32);
        let tilt = Tilt::new(0.5, vec![0.0, 90.0, 180.0, 270.0])
            .with_moment(
                Product::Ref,
                Moment {
                    data,
                    gate_spacing_m: 1000.0,
                    first_gate_m: 0.0,
                },
            )
            .unwrap()
            .with_moment(
                Product::Vel,
                Moment {
                    data: Grid2D::filled(4, 15, 2.0),
                    gate_spacing_m: 1000.0,
                    first_gate_m: 0.0,
                },
            )
            .unwrap();
        Scan {
            site: Site {
                code: "Z9999".into(),
                name: "Test".into(),
                longitude: 113.0,
                latitude: 23.0,
                antenna_height_m: 100.0,
                ground_height_m: 50.0,
            },
            scan_time: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            task_name: "VCP21".into(),
            tilts: vec![tilt],
        }
    }

    #[test]
    fn test_sweep_pads_beyond_recorded_gates() {
        let sweep = tiny_scan().sweep(0, 15.0, Product::Ref).unwrap();
        assert_eq!(sweep.shape(), (4, 15));
        assert_eq!(sweep.values[(1, 3)], 13.0);
        assert!(sweep.values[(1, 12)].is_nan());
    }

    #[test]
    fn test_sweep_stops_at_furthest_recorded_gate() {
        let scan = tiny_scan();
        assert_eq!(scan.tilts[0].max_reach_m(), 15_000.0);
        for range_km in [20.0, 2000.0, 1e6, 1e19, f64::MAX] {
            let reflectivity = scan.sweep(0, range_km, Product::Ref).unwrap();
            let velocity = scan.sweep(0, range_km, Product::Vel).unwrap();
            assert_eq!(reflectivity.shape(), (4, 15));
            assert_eq!(velocity.shape(), (4, 15));
            assert_eq!(reflectivity.range_km, range_km);
        }
    }

    #[test]
    fn test_sweep_truncates_to_range() {
        let sweep = tiny_scan().sweep(0, 5.5, Product::Ref).unwrap();
        assert_eq!(sweep.shape(), (4, 5));
        assert_eq!(sweep.slant_ranges_m[0], 500.0);
    }

    #[test]
    fn test_sweep_errors() {
        let scan = tiny_scan();
        assert!(matches!(
            scan.sweep(3, 10.0, Product::Ref),
            Err(ScanError::TiltOutOfRange { tilt: 3, count: 1 })
        ));
        assert!(matches!(
            scan.sweep(0, 10.0, Product::Sw),
            Err(ScanError::ProductUnavailable { .. })
        ));
        assert!(matches!(
            scan.sweep(0, 0.4, Product::Ref),
            Err(ScanError::InvalidRange(_))
        ));
        assert!(matches!(
            scan.sweep(0, -1.0, Product::Ref),
            Err(ScanError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_with_moment_rejects_wrong_radials() {
        let moment = Moment {
            data: Grid2D::filled(3, 5, 0.0),
            gate_spacing_m: 250.0,
            first_gate_m: 0.0,
        };
        assert!(Tilt::new(1.5, vec![0.0; 4]).with_moment(Product::Vel, moment).is_err());
    }
}
