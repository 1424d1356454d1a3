//! Radar Volume Viewer
//!
//! Desktop viewer for weather radar base data. The window is a thin eframe
//! shell over [`ViewerSession`], which holds all document state and can be
//! driven without a display.

pub mod commands;
pub mod config;
pub mod session;
pub mod surface;
pub mod ui;

pub use commands::Command;
pub use config::ViewerConfig;
pub use session::{MapView, Selection, ViewerSession};
pub use surface::ViewerSurface;
pub use ui::ViewerApp;
