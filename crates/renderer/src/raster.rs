//! Sweep rasterisation.
//!
//! Every plot pixel is inverse-projected to (azimuth, ground distance) about
//! the radar and looked up in the sweep: nearest radial by azimuth, gate by
//! ground-distance bin. Rows are coloured in parallel.

use image::{Rgba, RgbaImage};
use projection::azimuthal::plane_azimuth;
use radar_io::SweepData;
use rayon::prelude::*;

use crate::colormap::Colormap;
use crate::map_frame::MapFrame;

/// Fraction of the typical radial spacing a pixel may sit from its radial.
const RADIAL_TOLERANCE: f64 = 0.75;

/// Nearest-radial lookup over a sweep's azimuths.
#[derive(Debug, Clone)]
pub struct RadialIndex {
    /// `(azimuth in [0, 360), row)` sorted by azimuth
    sorted: Vec<(f64, usize)>,
    tolerance_deg: f64,
}

impl RadialIndex {
    pub fn new(azimuths: &[f64]) -> Self {
        let mut sorted: Vec<(f64, usize)> = azimuths
            .iter()
            .enumerate()
            .filter(|(_, az)| az.is_finite())
            .map(|(row, az)| (az.rem_euclid(360.0), row))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let tolerance_deg = match sorted.len() {
            0 => 0.0,
            1 => 180.0,
            n => {
                let mut gaps: Vec<f64> = sorted.windows(2).map(|w| w[1].0 - w[0].0).collect();
                gaps.push(sorted[0].0 + 360.0 - sorted[n - 1].0);
                gaps.sort_by(|a, b| a.total_cmp(b));
                gaps[gaps.len() / 2] * RADIAL_TOLERANCE
            }
        };

        Self {
            sorted,
            tolerance_deg,
        }
    }

    /// Row of the radial closest to `azimuth`, if it is close enough.
    pub fn nearest(&self, azimuth: f64) -> Option<usize> {
        let n = self.sorted.len();
        if n == 0 || !azimuth.is_finite() {
            return None;
        }
        let az = azimuth.rem_euclid(360.0);
        let pos = self.sorted.partition_point(|e| e.0 < az);

        let after = self.sorted[pos % n];
        let before = self.sorted[(pos + n - 1) % n];
        let (best_az, best_row) = if angular_distance(az, before.0) <= angular_distance(az, after.0) {
            before
        } else {
            after
        };

        (angular_distance(az, best_az) <= self.tolerance_deg).then_some(best_row)
    }
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// Gate lookup by ground distance. Gate `i` covers `[edges[i], edges[i+1])`.
#[derive(Debug, Clone)]
pub struct GateIndex {
    edges: Vec<f64>,
}

impl GateIndex {
    /// Build from gate-centre ground distances.
    pub fn new(centres: &[f64]) -> Self {
        let n = centres.len();
        let edges = match n {
            0 => Vec::new(),
            1 => vec![0.0, centres[0] * 2.0],
            _ => {
                let mut edges = Vec::with_capacity(n + 1);
                edges.push((centres[0] - (centres[1] - centres[0]) / 2.0).max(0.0));
                edges.extend(centres.windows(2).map(|w| (w[0] + w[1]) / 2.0));
                edges.push(centres[n - 1] + (centres[n - 1] - centres[n - 2]) / 2.0);
                edges
            }
        };
        Self { edges }
    }

    pub fn outer_edge(&self) -> f64 {
        self.edges.last().copied().unwrap_or(0.0)
    }

    pub fn locate(&self, distance: f64) -> Option<usize> {
        let (first, last) = (self.edges.first()?, self.edges.last()?);
        if !(distance >= *first && distance < *last) {
            return None;
        }
        Some(self.edges.partition_point(|e| *e <= distance) - 1)
    }
}

/// Colour the sweep into an image the size of the frame's plot rectangle.
///
/// Pixels outside the sweep and gates with no valid value stay transparent.
pub fn rasterize_sweep(sweep: &SweepData, colormap: &Colormap, frame: &MapFrame) -> RgbaImage {
    let rect = frame.rect();
    let mut image = RgbaImage::from_pixel(rect.width, rect.height, Rgba([0, 0, 0, 0]));
    if rect.width == 0 || rect.height == 0 {
        return image;
    }

    let radials = RadialIndex::new(&sweep.azimuths);
    let gates = GateIndex::new(&sweep.ground_distances_m);
    let max_distance = gates.outer_edge();
    let (radar_x, radar_y) = frame
        .projection()
        .forward(sweep.center.lon, sweep.center.lat)
        .unwrap_or((0.0, 0.0));

    let row_len = rect.width as usize * 4;
    let buffer: &mut [u8] = &mut image;
    buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(row, line)| {
            let py = rect.y as f64 + row as f64 + 0.5;
            for (col, pixel) in line.chunks_exact_mut(4).enumerate() {
                let px = rect.x as f64 + col as f64 + 0.5;
                let (x, y) = frame.pixel_to_projected(px, py);
                let (dx, dy) = (x - radar_x, y - radar_y);
                let distance = dx.hypot(dy);
                if distance >= max_distance {
                    continue;
                }
                let color = radials
                    .nearest(plane_azimuth(dx, dy))
                    .zip(gates.locate(distance))
                    .and_then(|(r, g)| sweep.values.get(r, g))
                    .and_then(|v| colormap.color(v));
                if let Some([r, g, b]) = color {
                    pixel.copy_from_slice(&[r, g, b, 255]);
                }
            }
        });

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_radial_wraps_north() {
        let azimuths: Vec<f64> = (0..360).map(|i| i as f64 + 0.5).collect();
        let index = RadialIndex::new(&azimuths);
        assert_eq!(index.nearest(359.9), Some(359));
        assert_eq!(index.nearest(0.2), Some(0));
        assert_eq!(index.nearest(89.9), Some(89));
        assert_eq!(index.nearest(90.1), Some(90));
    }

    #[test]
    fn test_nearest_radial_respects_gaps() {
        let azimuths: Vec<f64> = (0..90).map(|i| i as f64 + 0.5).collect();
        let index = RadialIndex::new(&azimuths);
        assert_eq!(index.nearest(45.0), Some(44));
        assert_eq!(index.nearest(180.0), None);
    }

    #[test]
    fn test_unsorted_azimuths_keep_row_numbers() {
        let index = RadialIndex::new(&[180.0, 0.0, 90.0, 270.0]);
        assert_eq!(index.nearest(91.0), Some(2));
        assert_eq!(index.nearest(1.0), Some(1));
    }

    #[test]
    fn test_gate_bins() {
        let gates = GateIndex::new(&[500.0, 1500.0, 2500.0]);
        assert_eq!(gates.locate(0.0), Some(0));
        assert_eq!(gates.locate(999.9), Some(0));
        assert_eq!(gates.locate(1000.0), Some(1));
        assert_eq!(gates.locate(2999.0), Some(2));
        assert_eq!(gates.locate(3000.0), None);
        assert_eq!(gates.outer_edge(), 3000.0);
    }

    #[test]
    fn test_empty_gate_index() {
        let gates = GateIndex::new(&[]);
        assert_eq!(gates.locate(10.0), None);
        assert_eq!(gates.outer_edge(), 0.0);
    }
}
