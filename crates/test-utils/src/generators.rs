//! Test data generators for creating synthetic radar-like data.
//!
//! These generators create predictable, verifiable patterns laid out as
//! `(radials, gates)` grids, the shape every sweep in the workspace uses.

use radar_common::Grid2D;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `row * 1000 + col`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(5, 10);
/// assert_eq!(grid.shape(), (5, 10));
/// assert_eq!(grid[(0, 1)], 1.0);
/// assert_eq!(grid[(1, 0)], 1000.0);
/// ```
pub fn create_test_grid(rows: usize, cols: usize) -> Grid2D {
    Grid2D::from_fn(rows, cols, |r, c| (r * 1000 + c) as f32)
}

/// Evenly spaced radial azimuths in degrees, starting at half a step.
pub fn create_azimuths(radials: usize) -> Vec<f64> {
    let step = 360.0 / radials.max(1) as f64;
    (0..radials).map(|i| (i as f64 + 0.5) * step).collect()
}

/// Creates a reflectivity field with a single convective cell.
///
/// The cell peaks at 55 dBZ a third of the way along the range and a quarter
/// of the way round the sweep. Values below 5 dBZ are NaN, as a radar would
/// report them.
pub fn create_reflectivity_grid(radials: usize, gates: usize) -> Grid2D {
    let cell_radial = radials as f32 / 4.0;
    let cell_gate = gates as f32 / 3.0;
    let sigma = (gates.min(radials).max(1) as f32) / 6.0;
    Grid2D::from_fn(radials, gates, |r, g| {
        let dr = r as f32 - cell_radial;
        let dg = g as f32 - cell_gate;
        let dbz = 55.0 * (-(dr * dr + dg * dg) / (2.0 * sigma * sigma)).exp();
        if dbz < 5.0 {
            f32::NAN
        } else {
            dbz
        }
    })
}

/// Creates a radial velocity field for uniform wind blowing from the north.
///
/// Velocity is `-amplitude * cos(azimuth)`, so it is negative (towards the
/// radar) to the north and positive to the south.
pub fn create_velocity_grid(radials: usize, gates: usize, amplitude: f32) -> Grid2D {
    let azimuths = create_azimuths(radials);
    Grid2D::from_fn(radials, gates, |r, _| {
        -amplitude * (azimuths[r].to_radians() as f32).cos()
    })
}

/// Creates a spectrum width field increasing linearly with gate index from
/// `start` to `end` m/s.
pub fn create_spectrum_width_grid(radials: usize, gates: usize, start: f32, end: f32) -> Grid2D {
    let step = if gates > 1 {
        (end - start) / (gates - 1) as f32
    } else {
        0.0
    };
    Grid2D::from_fn(radials, gates, |_, g| start + step * g as f32)
}

/// Creates a ground-clutter pattern: near-zero velocity and spectrum width
/// inside the first `clutter_gates` gates, weather-like values beyond.
///
/// Returns `(velocity, spectrum_width)`.
pub fn create_clutter_fields(radials: usize, gates: usize, clutter_gates: usize) -> (Grid2D, Grid2D) {
    let velocity = Grid2D::from_fn(radials, gates, |_, g| {
        if g < clutter_gates {
            0.2
        } else {
            8.0
        }
    });
    let width = Grid2D::from_fn(radials, gates, |_, g| {
        if g < clutter_gates {
            0.5
        } else {
            3.0
        }
    });
    (velocity, width)
}

/// Creates a grid of NaN values (completely missing data).
pub fn create_missing_grid(rows: usize, cols: usize) -> Grid2D {
    Grid2D::filled(rows, cols, f32::NAN)
}
