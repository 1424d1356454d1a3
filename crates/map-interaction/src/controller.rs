//! Pan/zoom state machine.

use radar_common::GeoExtent;
use tracing::debug;

use crate::config::InteractionConfig;
use crate::event::{PointerButton, PointerEvent, ScrollDirection};
use crate::pan::PanSession;
use crate::surface::{MapSurface, ScreenPoint};
use crate::zoom::zoom_extent;

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Nothing changed.
    Ignored,
    PanStarted,
    Panned(GeoExtent),
    PanEnded,
    Zoomed(GeoExtent),
    /// The extent went back to the one captured after the last render.
    Reset(GeoExtent),
}

impl Outcome {
    /// The new extent, for outcomes that changed it.
    pub fn extent(&self) -> Option<GeoExtent> {
        match self {
            Outcome::Panned(e) | Outcome::Zoomed(e) | Outcome::Reset(e) => Some(*e),
            _ => None,
        }
    }
}

/// Turns pointer events over a map into extent changes.
///
/// The controller holds no display. It reads and writes the extent through
/// [`MapSurface`] and never fails: an event that cannot be resolved to a
/// geographic position returns [`Outcome::Ignored`].
#[derive(Debug, Clone)]
pub struct PanZoomController {
    config: InteractionConfig,
    home: Option<GeoExtent>,
    pan: Option<PanSession>,
}

impl Default for PanZoomController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl PanZoomController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            home: None,
            pan: None,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Record the extent right-click resets to. Call after every render.
    pub fn set_home(&mut self, extent: GeoExtent) {
        self.home = Some(extent);
        self.pan = None;
    }

    pub fn home(&self) -> Option<GeoExtent> {
        self.home
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn handle<S>(&mut self, surface: &mut S, event: PointerEvent) -> Outcome
    where
        S: MapSurface + ?Sized,
    {
        match event {
            PointerEvent::Press {
                position,
                button: PointerButton::Primary,
            } => self.start_pan(surface, position),
            PointerEvent::Press {
                position,
                button: PointerButton::Secondary,
            } => self.reset(surface, position),
            PointerEvent::Press { .. } => Outcome::Ignored,
            PointerEvent::Move { position } => self.drag(surface, position),
            PointerEvent::Release { .. } | PointerEvent::Leave => self.end_pan(),
            PointerEvent::Scroll {
                position,
                direction,
            } => self.zoom(surface, position, direction),
        }
    }

    fn start_pan<S: MapSurface + ?Sized>(&mut self, surface: &mut S, position: ScreenPoint) -> Outcome {
        if !surface.contains(position) {
            return Outcome::Ignored;
        }
        let snapshot = surface.extent();
        let Some(anchor) = surface.geographic_at(position, &snapshot) else {
            return Outcome::Ignored;
        };
        debug!(lon = anchor.lon, lat = anchor.lat, "Pan started");
        self.pan = Some(PanSession::new(anchor, snapshot));
        Outcome::PanStarted
    }

    fn drag<S: MapSurface + ?Sized>(&mut self, surface: &mut S, position: ScreenPoint) -> Outcome {
        let Some(session) = self.pan else {
            return Outcome::Ignored;
        };
        if !surface.contains(position) {
            return Outcome::Ignored;
        }
        let Some(current) = surface.geographic_at(position, &session.snapshot) else {
            return Outcome::Ignored;
        };
        let extent = session.extent_for(current);
        surface.set_extent(extent);
        surface.request_redraw();
        Outcome::Panned(extent)
    }

    fn end_pan(&mut self) -> Outcome {
        match self.pan.take() {
            Some(_) => {
                debug!("Pan ended");
                Outcome::PanEnded
            }
            None => Outcome::Ignored,
        }
    }

    fn reset<S: MapSurface + ?Sized>(&mut self, surface: &mut S, position: ScreenPoint) -> Outcome {
        if !surface.contains(position) {
            return Outcome::Ignored;
        }
        let Some(home) = self.home else {
            return Outcome::Ignored;
        };
        surface.set_extent(home);
        surface.request_redraw();
        debug!(extent = %home, "View reset");
        Outcome::Reset(home)
    }

    fn zoom<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        position: ScreenPoint,
        direction: ScrollDirection,
    ) -> Outcome {
        if !surface.contains(position) {
            return Outcome::Ignored;
        }
        let extent = surface.extent();
        let Some(center) = surface.geographic_at(position, &extent) else {
            return Outcome::Ignored;
        };
        let scale = match direction {
            ScrollDirection::Forward => 1.0 / self.config.zoom_step,
            ScrollDirection::Backward => self.config.zoom_step,
        };
        let zoomed = zoom_extent(&extent, center, scale, &self.config);
        surface.set_extent(zoomed);
        surface.request_redraw();
        debug!(scale = scale, extent = %zoomed, "Zoomed");
        Outcome::Zoomed(zoomed)
    }
}
