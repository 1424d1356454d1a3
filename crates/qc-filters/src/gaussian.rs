//! Separable Gaussian smoothing.
//!
//! Output matches `scipy.ndimage.gaussian_filter` with its defaults:
//! `mode='reflect'` (the edge sample is repeated, `d c b a | a b c d`) and
//! `truncate=4.0`. NaN inputs are not special-cased, so any NaN inside the
//! kernel footprint makes the output NaN.

use radar_common::Grid2D;

/// Default kernel extent in standard deviations.
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Normalised 1D kernel for `sigma`, radius `floor(truncate * sigma + 0.5)`.
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as i64;
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / (sigma * sigma)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Map an out-of-range index back inside `[0, len)` by half-sample reflection.
fn reflect_index(i: i64, len: usize) -> usize {
    let n = len as i64;
    if n == 1 {
        return 0;
    }
    let period = 2 * n;
    let mut m = i.rem_euclid(period);
    if m >= n {
        m = period - 1 - m;
    }
    m as usize
}

/// Correlate `input` with `kernel`, reading `len` samples `stride` apart.
fn correlate_line(input: &[f32], start: usize, stride: usize, len: usize, kernel: &[f64], out: &mut [f32]) {
    let radius = (kernel.len() / 2) as i64;
    for i in 0..len {
        let mut acc = 0.0f64;
        for (k, &w) in kernel.iter().enumerate() {
            let j = reflect_index(i as i64 + k as i64 - radius, len);
            acc += w * input[start + j * stride] as f64;
        }
        out[start + i * stride] = acc as f32;
    }
}

/// Smooth along rows then columns.
pub fn gaussian_filter(grid: &Grid2D, sigma: f64) -> Grid2D {
    gaussian_filter_with_truncate(grid, sigma, DEFAULT_TRUNCATE)
}

fn gaussian_filter_with_truncate(grid: &Grid2D, sigma: f64, truncate: f64) -> Grid2D {
    let (rows, cols) = grid.shape();
    if grid.is_empty() {
        return grid.clone();
    }
    let kernel = gaussian_kernel(sigma, truncate);

    // Axis 0: down each column
    let mut pass = grid.clone();
    let input = grid.as_slice();
    for c in 0..cols {
        correlate_line(input, c, cols, rows, &kernel, pass.as_mut_slice());
    }

    // Axis 1: along each row
    let mut out = pass.clone();
    for r in 0..rows {
        correlate_line(pass.as_slice(), r * cols, 1, cols, &kernel, out.as_mut_slice());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_radius_and_sum() {
        let kernel = gaussian_kernel(1.0, 4.0);
        assert_eq!(kernel.len(), 9);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(kernel[4] > kernel[3]);
        assert!((kernel[0] - kernel[8]).abs() < 1e-15);
    }

    #[test]
    fn test_reflect_index() {
        // d c b a | a b c d | d c b a
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-4, 4), 3);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(7, 4), 0);
        assert_eq!(reflect_index(8, 4), 0);
        assert_eq!(reflect_index(-3, 1), 0);
    }

    #[test]
    fn test_constant_field_unchanged() {
        let grid = Grid2D::filled(5, 7, 42.0);
        let out = gaussian_filter(&grid, 1.0);
        for &v in out.as_slice() {
            assert!((v - 42.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_nan_spreads_within_radius() {
        let mut grid = Grid2D::filled(1, 20, 1.0);
        grid.as_mut_slice()[10] = f32::NAN;
        let out = gaussian_filter(&grid, 1.0);
        assert!(out[(0, 6)].is_nan());
        assert!(out[(0, 14)].is_nan());
        assert!(!out[(0, 5)].is_nan());
        assert!(!out[(0, 15)].is_nan());
    }
}
