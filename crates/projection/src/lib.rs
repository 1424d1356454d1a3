//! Coordinate transformations for radar sweeps.
//!
//! Implements the azimuthal-equidistant projection used to place radar gates
//! on a map, and the beam geometry that turns slant range into ground distance.

pub mod azimuthal;
pub mod beam;

pub use azimuthal::{AzimuthalEquidistant, EARTH_RADIUS_M};
pub use beam::BeamGeometry;
