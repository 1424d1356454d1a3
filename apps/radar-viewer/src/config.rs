//! Viewer configuration loading and types.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Context, Result};
use map_interaction::InteractionConfig;
use renderer::FigureSpec;
use serde::{Deserialize, Serialize};

/// File name looked for during discovery.
pub const CONFIG_FILE_NAME: &str = "radar-viewer.yaml";

/// Viewer configuration loaded from YAML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Initial window size in logical points
    pub window_width: f32,
    pub window_height: f32,

    /// Range field contents for a freshly opened file, km
    pub default_range_km: f64,

    /// Figure size in inches
    pub figure_width_in: f32,
    pub figure_height_in: f32,

    /// Resolution of the on-screen figure. Exports always use 300 DPI.
    pub screen_dpi: f32,

    /// GeoJSON boundaries drawn by the overlay toggle.
    pub boundary_file: Option<PathBuf>,

    /// Replaces the built-in colormap styles.
    pub style_file: Option<PathBuf>,

    /// TrueType fonts tried before the system defaults.
    pub font_paths: Vec<PathBuf>,

    pub interaction: InteractionConfig,

    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1100.0,
            window_height: 650.0,
            default_range_km: 75.0,
            figure_width_in: 6.0,
            figure_height_in: 6.0,
            screen_dpi: 100.0,
            boundary_file: None,
            style_file: None,
            font_paths: Vec::new(),
            interaction: InteractionConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parse a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ViewerConfig =
            serde_yaml::from_str(content).context("Failed to parse viewer config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file. Relative paths inside it are resolved against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let mut config =
            Self::from_yaml(&content).with_context(|| format!("Invalid config file: {:?}", path))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Look for [`CONFIG_FILE_NAME`] in the working directory, then next to
    /// the executable.
    ///
    /// `Ok(None)` when neither exists. A file that exists but fails to parse
    /// is an error; the caller decides whether to fall back to defaults.
    pub fn discover() -> Result<Option<(PathBuf, Self)>> {
        for dir in search_dirs() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                let config = Self::from_file(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.window_width > 0.0 && self.window_height > 0.0,
            "window size must be positive, got {}x{}",
            self.window_width,
            self.window_height
        );
        ensure!(
            self.default_range_km.is_finite() && self.default_range_km > 0.0,
            "default_range_km must be positive, got {}",
            self.default_range_km
        );
        ensure!(
            self.figure_width_in > 0.0 && self.figure_height_in > 0.0,
            "figure size must be positive, got {}x{} in",
            self.figure_width_in,
            self.figure_height_in
        );
        ensure!(
            self.screen_dpi.is_finite() && self.screen_dpi > 0.0,
            "screen_dpi must be positive, got {}",
            self.screen_dpi
        );
        self.interaction
            .validate()
            .map_err(|e| anyhow!("interaction: {}", e))?;
        Ok(())
    }

    /// The on-screen figure.
    pub fn figure(&self) -> FigureSpec {
        FigureSpec::new(self.figure_width_in, self.figure_height_in, self.screen_dpi)
    }

    /// Text for the range field, without a trailing `.0`.
    pub fn default_range_text(&self) -> String {
        format!("{}", self.default_range_km)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.boundary_file.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.style_file.as_mut() {
            resolve(p);
        }
        self.font_paths.iter_mut().for_each(resolve);
    }
}

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        if !dirs.contains(&exe_dir) {
            dirs.push(exe_dir);
        }
    }
    dirs
}
