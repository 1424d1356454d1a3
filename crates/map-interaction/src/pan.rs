//! Anchor-relative panning.

use radar_common::{GeoExtent, GeoPoint};

/// State captured when a drag starts.
///
/// Every move is computed from the snapshot, never from the live extent, so
/// the result depends only on where the drag started and where the cursor is
/// now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSession {
    /// Geographic point under the cursor at press time
    pub anchor: GeoPoint,
    /// Extent at press time
    pub snapshot: GeoExtent,
}

impl PanSession {
    pub fn new(anchor: GeoPoint, snapshot: GeoExtent) -> Self {
        Self { anchor, snapshot }
    }

    /// Extent that puts the anchor under a cursor now at `current`.
    ///
    /// `current` must be resolved against [`PanSession::snapshot`].
    pub fn extent_for(&self, current: GeoPoint) -> GeoExtent {
        let dlon = self.anchor.lon - current.lon;
        let dlat = self.anchor.lat - current.lat;
        self.snapshot.translated(dlon, dlat).shifted_within_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_east_moves_view_west() {
        let snapshot = GeoExtent::new(110.0, 116.0, 20.0, 26.0).unwrap();
        let session = PanSession::new(GeoPoint::new(113.0, 23.0), snapshot);
        let extent = session.extent_for(GeoPoint::new(114.0, 23.5));
        assert_eq!(extent.to_array(), [109.0, 115.0, 19.5, 25.5]);
    }

    #[test]
    fn test_no_motion_no_change() {
        let snapshot = GeoExtent::new(110.0, 116.0, 20.0, 26.0).unwrap();
        let session = PanSession::new(GeoPoint::new(113.0, 23.0), snapshot);
        assert_eq!(session.extent_for(GeoPoint::new(113.0, 23.0)), snapshot);
    }
}
