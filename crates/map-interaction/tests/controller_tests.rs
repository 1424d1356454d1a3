//! Behavioural tests for the pan/zoom controller.

use map_interaction::{
    InteractionConfig, LinearSurface, MapSurface, Outcome, PanZoomController, PointerButton,
    PointerEvent, ScreenPoint, ScrollDirection,
};
use radar_common::{GeoExtent, GeoPoint};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, fixtures};

fn extent_of((lon_min, lon_max, lat_min, lat_max): (f64, f64, f64, f64)) -> GeoExtent {
    GeoExtent::new(lon_min, lon_max, lat_min, lat_max).unwrap()
}

fn guangzhou_surface() -> LinearSurface {
    LinearSurface::new(extent_of(fixtures::extent::GUANGZHOU_75KM), 600.0, 600.0)
}

fn press(x: f64, y: f64) -> PointerEvent {
    PointerEvent::Press {
        position: ScreenPoint::new(x, y),
        button: PointerButton::Primary,
    }
}

fn move_to(x: f64, y: f64) -> PointerEvent {
    PointerEvent::Move {
        position: ScreenPoint::new(x, y),
    }
}

fn release(x: f64, y: f64) -> PointerEvent {
    PointerEvent::Release {
        position: ScreenPoint::new(x, y),
        button: PointerButton::Primary,
    }
}

fn scroll(x: f64, y: f64, direction: ScrollDirection) -> PointerEvent {
    PointerEvent::Scroll {
        position: ScreenPoint::new(x, y),
        direction,
    }
}

/// Surface whose inverse projection always fails.
struct BrokenSurface(LinearSurface);

impl MapSurface for BrokenSurface {
    fn extent(&self) -> GeoExtent {
        self.0.extent()
    }
    fn set_extent(&mut self, extent: GeoExtent) {
        self.0.set_extent(extent)
    }
    fn contains(&self, point: ScreenPoint) -> bool {
        self.0.contains(point)
    }
    fn geographic_at(&self, _point: ScreenPoint, _extent: &GeoExtent) -> Option<GeoPoint> {
        None
    }
    fn request_redraw(&mut self) {
        self.0.request_redraw()
    }
}

/// Small deterministic generator for sequence tests.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

// ============================================================================
// Panning
// ============================================================================

#[test]
fn test_pan_keeps_anchor_under_cursor() {
    let mut surface = guangzhou_surface();
    let mut controller = PanZoomController::default();

    assert_eq!(controller.handle(&mut surface, press(200.0, 300.0)), Outcome::PanStarted);
    let anchor = surface
        .geographic_at(ScreenPoint::new(200.0, 300.0), &surface.extent())
        .unwrap();

    for (x, y) in [(210.0, 305.0), (260.0, 280.0), (400.0, 100.0), (120.0, 550.0)] {
        let outcome = controller.handle(&mut surface, move_to(x, y));
        assert!(matches!(outcome, Outcome::Panned(_)));
        let screen = surface.screen_at(anchor);
        assert_coords_approx_eq!((screen.x, screen.y), (x, y), 1e-6);
    }
    assert_eq!(surface.redraws, 4);
}

#[test]
fn test_pan_independent_of_event_rate() {
    let mut coarse = guangzhou_surface();
    let mut fine = guangzhou_surface();
    let mut a = PanZoomController::default();
    let mut b = PanZoomController::default();

    a.handle(&mut coarse, press(100.0, 100.0));
    a.handle(&mut coarse, move_to(400.0, 250.0));

    b.handle(&mut fine, press(100.0, 100.0));
    for step in 1..=30 {
        let t = step as f64 / 30.0;
        b.handle(&mut fine, move_to(100.0 + 300.0 * t, 100.0 + 150.0 * t));
    }

    assert!(coarse.extent().approx_eq(&fine.extent(), 1e-9));
}

#[test]
fn test_pan_delta_applied_to_snapshot() {
    let mut surface = guangzhou_surface();
    let start = surface.extent();
    let mut controller = PanZoomController::default();

    controller.handle(&mut surface, press(300.0, 300.0));
    controller.handle(&mut surface, move_to(360.0, 300.0));
    let extent = surface.extent();

    // 60 px of 600 is a tenth of the span, dragged east so the view moves west
    let expected = start.translated(-start.lon_span() / 10.0, 0.0);
    assert!(extent.approx_eq(&expected, 1e-9));
    assert_approx_eq!(extent.lon_span(), start.lon_span(), 1e-12);
}

#[test]
fn test_release_and_leave_end_pan() {
    let mut surface = guangzhou_surface();
    let mut controller = PanZoomController::default();

    controller.handle(&mut surface, press(300.0, 300.0));
    assert_eq!(controller.handle(&mut surface, release(300.0, 300.0)), Outcome::PanEnded);
    assert!(!controller.is_panning());
    let before = surface.extent();
    assert_eq!(controller.handle(&mut surface, move_to(500.0, 500.0)), Outcome::Ignored);
    assert_eq!(surface.extent(), before);

    controller.handle(&mut surface, press(300.0, 300.0));
    assert_eq!(controller.handle(&mut surface, PointerEvent::Leave), Outcome::PanEnded);
    assert_eq!(controller.handle(&mut surface, PointerEvent::Leave), Outcome::Ignored);
}

#[test]
fn test_press_outside_map_ignored() {
    let mut surface = guangzhou_surface();
    let mut controller = PanZoomController::default();
    assert_eq!(controller.handle(&mut surface, press(700.0, 300.0)), Outcome::Ignored);
    assert!(!controller.is_panning());
}

#[test]
fn test_move_outside_map_is_noop_during_pan() {
    let mut surface = guangzhou_surface();
    let mut controller = PanZoomController::default();
    controller.handle(&mut surface, press(300.0, 300.0));
    let before = surface.extent();
    assert_eq!(controller.handle(&mut surface, move_to(-5.0, 300.0)), Outcome::Ignored);
    assert_eq!(surface.extent(), before);
    assert!(controller.is_panning());
}

#[test]
fn test_pan_shifts_back_inside_world() {
    let mut surface = LinearSurface::new(extent_of(fixtures::extent::NORTH_EAST_CORNER), 100.0, 100.0);
    let mut controller = PanZoomController::default();
    controller.handle(&mut surface, press(50.0, 50.0));
    // Drag towards the south-west: the view would move north-east off the globe
    controller.handle(&mut surface, move_to(0.0, 100.0));
    let extent = surface.extent();
    assert_eq!(extent.lon_max, 180.0);
    assert_eq!(extent.lat_max, 90.0);
    assert_approx_eq!(extent.lon_span(), 10.0, 1e-9);
    assert_approx_eq!(extent.lat_span(), 10.0, 1e-9);
}

// ============================================================================
// Zooming
// ============================================================================

#[test]
fn test_zoom_in_out_round_trip() {
    let mut surface = guangzhou_surface();
    let original = surface.extent();
    let mut controller = PanZoomController::default();

    for _ in 0..5 {
        controller.handle(&mut surface, scroll(150.0, 420.0, ScrollDirection::Forward));
    }
    assert!(surface.extent().lon_span() < original.lon_span());
    for _ in 0..5 {
        controller.handle(&mut surface, scroll(150.0, 420.0, ScrollDirection::Backward));
    }
    assert!(surface.extent().approx_eq(&original, 1e-9));
}

#[test]
fn test_zoom_keeps_point_under_cursor() {
    let mut surface = guangzhou_surface();
    let mut controller = PanZoomController::default();
    let cursor = ScreenPoint::new(123.0, 456.0);
    let under = surface.geographic_at(cursor, &surface.extent()).unwrap();

    let outcome = controller.handle(&mut surface, scroll(cursor.x, cursor.y, ScrollDirection::Forward));
    assert!(matches!(outcome, Outcome::Zoomed(_)));
    let screen = surface.screen_at(under);
    assert_coords_approx_eq!((screen.x, screen.y), (cursor.x, cursor.y), 1e-6);
}

#[test]
fn test_zoom_step_is_configurable() {
    let config = InteractionConfig {
        zoom_step: 2.0,
        ..InteractionConfig::default()
    };
    let mut surface = guangzhou_surface();
    let span = surface.extent().lon_span();
    let mut controller = PanZoomController::new(config);
    controller.handle(&mut surface, scroll(300.0, 300.0, ScrollDirection::Forward));
    assert_approx_eq!(surface.extent().lon_span(), span / 2.0, 1e-9);
}

#[test]
fn test_zoom_sequences_stay_valid() {
    let config = InteractionConfig::default();
    let mut rng = Lcg(42);

    for _ in 0..20 {
        let mut surface = LinearSurface::new(extent_of(fixtures::extent::GUANGZHOU_75KM), 400.0, 300.0);
        let mut controller = PanZoomController::new(config);
        for _ in 0..200 {
            let x = rng.next_f64() * 400.0;
            let y = rng.next_f64() * 300.0;
            let direction = if rng.next_f64() < 0.5 {
                ScrollDirection::Forward
            } else {
                ScrollDirection::Backward
            };
            controller.handle(&mut surface, scroll(x, y, direction));

            let e = surface.extent();
            assert!(e.lon_min >= -180.0 && e.lon_max <= 180.0, "{e}");
            assert!(e.lat_min >= -90.0 && e.lat_max <= 90.0, "{e}");
            assert!(e.lon_span() >= config.min_lon_span - 1e-9, "{e}");
            assert!(e.lat_span() >= config.min_lat_span - 1e-9, "{e}");
        }
    }
}

#[test]
fn test_scroll_outside_ignored() {
    let mut surface = guangzhou_surface();
    let before = surface.extent();
    let mut controller = PanZoomController::default();
    assert_eq!(
        controller.handle(&mut surface, scroll(601.0, 10.0, ScrollDirection::Forward)),
        Outcome::Ignored
    );
    assert_eq!(surface.extent(), before);
    assert_eq!(surface.redraws, 0);
}

// ============================================================================
// Reset and failures
// ============================================================================

#[test]
fn test_secondary_click_resets_to_home() {
    let mut surface = guangzhou_surface();
    let home = surface.extent();
    let mut controller = PanZoomController::default();
    controller.set_home(home);

    controller.handle(&mut surface, scroll(100.0, 100.0, ScrollDirection::Forward));
    assert_ne!(surface.extent(), home);

    let outcome = controller.handle(
        &mut surface,
        PointerEvent::Press {
            position: ScreenPoint::new(10.0, 10.0),
            button: PointerButton::Secondary,
        },
    );
    assert_eq!(outcome, Outcome::Reset(home));
    assert_eq!(surface.extent(), home);
}

#[test]
fn test_secondary_click_without_home_ignored() {
    let mut surface = guangzhou_surface();
    let mut controller = PanZoomController::default();
    let outcome = controller.handle(
        &mut surface,
        PointerEvent::Press {
            position: ScreenPoint::new(10.0, 10.0),
            button: PointerButton::Secondary,
        },
    );
    assert_eq!(outcome, Outcome::Ignored);
}

#[test]
fn test_middle_button_ignored() {
    let mut surface = guangzhou_surface();
    let mut controller = PanZoomController::default();
    let outcome = controller.handle(
        &mut surface,
        PointerEvent::Press {
            position: ScreenPoint::new(10.0, 10.0),
            button: PointerButton::Middle,
        },
    );
    assert_eq!(outcome, Outcome::Ignored);
}

#[test]
fn test_inverse_failure_is_silent() {
    let mut surface = BrokenSurface(guangzhou_surface());
    let before = surface.extent();
    let mut controller = PanZoomController::default();

    assert_eq!(controller.handle(&mut surface, press(300.0, 300.0)), Outcome::Ignored);
    assert_eq!(
        controller.handle(&mut surface, scroll(300.0, 300.0, ScrollDirection::Forward)),
        Outcome::Ignored
    );
    assert_eq!(surface.extent(), before);
    assert_eq!(surface.0.redraws, 0);
}

#[test]
fn test_works_through_trait_object() {
    let mut surface = guangzhou_surface();
    let dynamic: &mut dyn MapSurface = &mut surface;
    let mut controller = PanZoomController::default();
    let outcome = controller.handle(dynamic, scroll(300.0, 300.0, ScrollDirection::Backward));
    assert!(outcome.extent().is_some());
}
