//! The rendered figure as a pan/zoom target.

use map_interaction::{MapSurface, ScreenPoint};
use radar_common::{GeoExtent, GeoPoint};
use renderer::MapFrame;

/// Adapts a drawn figure to [`MapSurface`].
///
/// Screen points are figure pixels: the shell maps window coordinates into
/// the figure before handing events over. Setting the extent only records it;
/// the owner re-renders when [`ViewerSurface::needs_redraw`] is set.
#[derive(Debug, Clone)]
pub struct ViewerSurface {
    frame: MapFrame,
    redraw: bool,
}

impl ViewerSurface {
    pub fn new(frame: MapFrame) -> Self {
        Self {
            frame,
            redraw: false,
        }
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// The extent after whatever the controller did.
    pub fn into_extent(self) -> GeoExtent {
        self.frame.extent()
    }
}

impl MapSurface for ViewerSurface {
    fn extent(&self) -> GeoExtent {
        self.frame.extent()
    }

    fn set_extent(&mut self, extent: GeoExtent) {
        self.frame = self.frame.with_extent(extent);
    }

    fn contains(&self, point: ScreenPoint) -> bool {
        self.frame.contains_pixel(point.x, point.y)
    }

    fn geographic_at(&self, point: ScreenPoint, extent: &GeoExtent) -> Option<GeoPoint> {
        self.frame.geographic_at(point.x, point.y, extent)
    }

    fn request_redraw(&mut self) {
        self.redraw = true;
    }
}
