//! Range-dependent attenuation correction.

use radar_common::Grid2D;

/// Gain applied at the first gate.
pub const RAMP_START: f64 = 1.0;

/// Gain applied at the last gate.
pub const RAMP_END: f64 = 5.0;

/// Corrected values are clamped to this range (dB).
pub const OUTPUT_RANGE: (f32, f32) = (-10.0, 80.0);

/// Per-gate linear gain, `linspace(RAMP_START, RAMP_END, gates)`.
///
/// A single gate gets `RAMP_START`.
pub fn gain_ramp(gates: usize) -> Vec<f64> {
    match gates {
        0 => Vec::new(),
        1 => vec![RAMP_START],
        n => {
            let step = (RAMP_END - RAMP_START) / (n - 1) as f64;
            (0..n).map(|j| RAMP_START + step * j as f64).collect()
        }
    }
}

/// Boost each gate's power by the ramp gain and clamp the result.
///
/// Rows are rays, columns are gates. NaN stays NaN.
pub fn attenuation_correction(grid: &Grid2D) -> Grid2D {
    let (rows, cols) = grid.shape();
    let ramp = gain_ramp(cols);
    let out = Grid2D::from_fn(rows, cols, |r, g| {
        let db = grid[(r, g)];
        if db.is_nan() {
            return f32::NAN;
        }
        let linear = 10f64.powf(db as f64 / 10.0) * ramp[g];
        (10.0 * linear.log10()) as f32
    })
    .map(|v| v.clamp(OUTPUT_RANGE.0, OUTPUT_RANGE.1));
    tracing::debug!(rays = rows, gates = cols, "Applied attenuation correction");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_ramp() {
        assert!(gain_ramp(0).is_empty());
        assert_eq!(gain_ramp(1), vec![1.0]);
        assert_eq!(gain_ramp(5), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_nan_preserved() {
        let grid = Grid2D::new(1, 3, vec![f32::NAN, 20.0, f32::NAN]).unwrap();
        let out = attenuation_correction(&grid);
        assert!(out[(0, 0)].is_nan());
        assert!(out[(0, 2)].is_nan());
        assert!(out[(0, 1)] > 20.0);
    }

    #[test]
    fn test_clamped() {
        let grid = Grid2D::new(1, 2, vec![-40.0, 79.0]).unwrap();
        let out = attenuation_correction(&grid);
        assert_eq!(out[(0, 0)], -10.0);
        assert_eq!(out[(0, 1)], 80.0);
    }
}
