//! Pointer input, independent of any windowing toolkit.

use crate::surface::ScreenPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Scroll wheel direction. `Forward` (away from the user) zooms in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press {
        position: ScreenPoint,
        button: PointerButton,
    },
    Move {
        position: ScreenPoint,
    },
    Release {
        position: ScreenPoint,
        button: PointerButton,
    },
    /// The pointer left the map area.
    Leave,
    /// One scroll tick.
    Scroll {
        position: ScreenPoint,
        direction: ScrollDirection,
    },
}
