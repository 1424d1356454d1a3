//! Radar Volume Viewer
//!
//! Opens radar base-data files and shows one sweep at a time as a map.

use anyhow::{anyhow, Result};
use eframe::egui;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use radar_viewer::{ViewerApp, ViewerConfig, ViewerSession};

fn main() -> Result<()> {
    let discovered = ViewerConfig::discover();

    let log_level = match &discovered {
        Ok(Some((_, config))) => config.log_level.clone(),
        _ => ViewerConfig::default().log_level,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();

    let config = match discovered {
        Ok(Some((path, config))) => {
            info!(path = %path.display(), "Loaded configuration");
            config
        }
        Ok(None) => {
            info!("No configuration file found, using defaults");
            ViewerConfig::default()
        }
        Err(e) => {
            warn!("Ignoring configuration: {:#}", e);
            ViewerConfig::default()
        }
    };

    info!("Starting radar viewer");

    let session = ViewerSession::new(config.clone())?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_title("Radar Volume Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Radar Volume Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(session)))),
    )
    .map_err(|e| anyhow!("Window failed: {}", e))
}
