//! Mouse pan and zoom over a geographic map extent.
//!
//! [`PanZoomController`] consumes [`PointerEvent`]s and mutates the extent of
//! any [`MapSurface`]. It knows nothing about the windowing toolkit or the
//! projection; the surface supplies inverse projection.
//!
//! - Primary drag pans, keeping the grabbed point under the cursor.
//! - Scroll zooms by a fixed step about the cursor.
//! - Secondary click restores the extent of the last render.

pub mod config;
pub mod controller;
pub mod event;
pub mod pan;
pub mod surface;
pub mod zoom;

pub use config::InteractionConfig;
pub use controller::{Outcome, PanZoomController};
pub use event::{PointerButton, PointerEvent, ScrollDirection};
pub use pan::PanSession;
pub use surface::{LinearSurface, MapSurface, ScreenPoint};
pub use zoom::zoom_extent;
