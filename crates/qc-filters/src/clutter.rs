//! Ground-clutter suppression.
//!
//! Clutter returns are stationary and narrow: near-zero radial velocity and
//! near-zero spectrum width. Such cells are masked, then the whole field is
//! smoothed.

use radar_common::{Grid2D, GridError};

use crate::gaussian::gaussian_filter;

/// Cells with `|velocity|` below this (m/s) are clutter candidates.
pub const VELOCITY_THRESHOLD: f32 = 1.0;

/// Cells with spectrum width below this (m/s) are clutter candidates.
pub const WIDTH_THRESHOLD: f32 = 1.0;

/// Smoothing applied after masking.
pub const SMOOTHING_SIGMA: f64 = 1.0;

/// Set clutter cells of `reflectivity` to NaN.
///
/// NaN velocity or width never satisfies the comparison, so cells without
/// Doppler data are kept.
pub fn mask_clutter(
    reflectivity: &Grid2D,
    velocity: &Grid2D,
    spectrum_width: &Grid2D,
) -> Result<Grid2D, GridError> {
    reflectivity.ensure_same_shape(velocity)?;
    reflectivity.ensure_same_shape(spectrum_width)?;

    let mut out = reflectivity.clone();
    let mut masked = 0usize;
    for ((value, &vel), &sw) in out
        .as_mut_slice()
        .iter_mut()
        .zip(velocity.as_slice())
        .zip(spectrum_width.as_slice())
    {
        if vel.abs() < VELOCITY_THRESHOLD && sw < WIDTH_THRESHOLD {
            *value = f32::NAN;
            masked += 1;
        }
    }
    tracing::debug!(masked = masked, cells = out.as_slice().len(), "Masked clutter cells");
    Ok(out)
}

/// Mask clutter, then smooth with a sigma-1 Gaussian.
pub fn clutter_filter(
    reflectivity: &Grid2D,
    velocity: &Grid2D,
    spectrum_width: &Grid2D,
) -> Result<Grid2D, GridError> {
    let masked = mask_clutter(reflectivity, velocity, spectrum_width)?;
    Ok(gaussian_filter(&masked, SMOOTHING_SIGMA))
}
