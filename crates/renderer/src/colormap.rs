//! Colormaps built from JSON style definitions.
//!
//! The default styles ship inside the binary (`styles/radar.json`). A style
//! is a list of colour stops keyed by data value. `"stepped"` styles paint
//! each band `[stop_i, stop_i+1)` with the colour of its lower stop;
//! `"gradient"` styles interpolate linearly between stops. Styles with
//! `"scale": "data"` carry stops in `[0, 1]` which are stretched over the
//! finite range of the data being drawn.

use std::collections::HashMap;
use std::path::Path;

use radar_common::Product;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Styles compiled into the binary.
pub const EMBEDDED_STYLES: &str = include_str!("../styles/radar.json");

/// Style used for products without a dedicated entry.
pub const FALLBACK_STYLE: &str = "turbo";

/// Style configuration loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    pub version: String,
    pub styles: HashMap<String, StyleDefinition>,
}

/// A single style definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub style_type: String,
    pub units: Option<String>,
    /// `"data"` when stop values are fractions of the data range
    pub scale: Option<String>,
    pub stops: Vec<ColorStop>,
    pub interpolation: Option<String>,
    /// `"clamp"` (default) or `"transparent"`
    pub out_of_range: Option<String>,
}

/// Color stop
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f32,
    pub color: String,
    pub label: Option<String>,
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load style configuration from file
    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The styles compiled into the binary.
    pub fn embedded() -> RenderResult<Self> {
        Self::from_json(EMBEDDED_STYLES)
    }

    /// Get a specific style definition
    pub fn get_style(&self, name: &str) -> Option<&StyleDefinition> {
        self.styles.get(name)
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Which colour table the View menu asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapChoice {
    /// The product's own style
    #[default]
    Product,
    Turbo,
    Viridis,
}

impl ColormapChoice {
    pub const ALL: [ColormapChoice; 3] = [
        ColormapChoice::Product,
        ColormapChoice::Turbo,
        ColormapChoice::Viridis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ColormapChoice::Product => "Product default",
            ColormapChoice::Turbo => "Turbo",
            ColormapChoice::Viridis => "Viridis",
        }
    }

    fn style_key(&self, product: Product) -> &'static str {
        match self {
            ColormapChoice::Product => product.as_str(),
            ColormapChoice::Turbo => "turbo",
            ColormapChoice::Viridis => "viridis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColormapKind {
    Gradient,
    Stepped,
}

/// A resolved value-to-colour mapping.
///
/// Always holds at least one stop, sorted by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    units: String,
    kind: ColormapKind,
    stops: Vec<(f32, [u8; 3])>,
    clamp: bool,
}

impl Colormap {
    /// Resolve a style definition.
    ///
    /// `data_range` is only consulted for data-scaled styles. A missing or
    /// degenerate range falls back to `[0, 1]` or a unit window around the
    /// single value.
    pub fn from_definition(def: &StyleDefinition, data_range: Option<(f32, f32)>) -> RenderResult<Self> {
        let invalid = |reason: String| RenderError::InvalidStyle {
            name: def.name.clone(),
            reason,
        };

        let kind = match def.style_type.as_str() {
            "gradient" => ColormapKind::Gradient,
            "stepped" => ColormapKind::Stepped,
            other => return Err(invalid(format!("unsupported style type '{}'", other))),
        };
        if def.stops.is_empty() {
            return Err(invalid("no colour stops".to_string()));
        }

        let (offset, span) = if def.scale.as_deref() == Some("data") {
            match data_range {
                Some((lo, hi)) if lo.is_finite() && hi.is_finite() && hi > lo => (lo, hi - lo),
                Some((lo, _)) if lo.is_finite() => (lo - 0.5, 1.0),
                _ => (0.0, 1.0),
            }
        } else {
            (0.0, 1.0)
        };

        let mut stops = Vec::with_capacity(def.stops.len());
        for stop in &def.stops {
            let (r, g, b) = hex_to_rgb(&stop.color)
                .ok_or_else(|| invalid(format!("bad colour '{}'", stop.color)))?;
            if !stop.value.is_finite() {
                return Err(invalid("non-finite stop value".to_string()));
            }
            stops.push((offset + stop.value * span, [r, g, b]));
        }
        if stops.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(invalid("stop values must ascend".to_string()));
        }

        Ok(Self {
            name: def.name.clone(),
            units: def.units.clone().unwrap_or_default(),
            kind,
            stops,
            clamp: def.out_of_range.as_deref() != Some("transparent"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn kind(&self) -> ColormapKind {
        self.kind
    }

    pub fn vmin(&self) -> f32 {
        self.stops[0].0
    }

    pub fn vmax(&self) -> f32 {
        self.stops[self.stops.len() - 1].0
    }

    /// Colour for a data value. `None` means transparent.
    pub fn color(&self, value: f32) -> Option<[u8; 3]> {
        if !value.is_finite() {
            return None;
        }
        let (vmin, vmax) = (self.vmin(), self.vmax());
        if (value < vmin || value > vmax) && !self.clamp {
            return None;
        }
        let v = value.clamp(vmin, vmax);

        // Index of the last stop at or below v
        let idx = self.stops.partition_point(|s| s.0 <= v).saturating_sub(1);
        let (lo_value, lo_color) = self.stops[idx];

        match self.kind {
            ColormapKind::Stepped => Some(lo_color),
            ColormapKind::Gradient => {
                let Some(&(hi_value, hi_color)) = self.stops.get(idx + 1) else {
                    return Some(lo_color);
                };
                let width = hi_value - lo_value;
                if width <= 0.0 {
                    return Some(hi_color);
                }
                let t = (v - lo_value) / width;
                Some(lerp_rgb(lo_color, hi_color, t))
            }
        }
    }

    /// Colour at a fraction of the way from `vmin` to `vmax`, for colorbars.
    pub fn color_at_fraction(&self, t: f32) -> [u8; 3] {
        let v = self.vmin() + t.clamp(0.0, 1.0) * (self.vmax() - self.vmin());
        self.color(v).unwrap_or(self.stops[0].1)
    }
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round().clamp(0.0, 255.0) as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Loaded styles plus the lookup rules for products and overrides.
#[derive(Debug, Clone)]
pub struct ColormapSet {
    config: StyleConfig,
}

impl ColormapSet {
    pub fn new(config: StyleConfig) -> Self {
        Self { config }
    }

    pub fn embedded() -> RenderResult<Self> {
        Ok(Self::new(StyleConfig::embedded()?))
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Colormap for drawing `product` under `choice`.
    ///
    /// Products without a style of their own use [`FALLBACK_STYLE`] scaled to
    /// `data_range`.
    pub fn colormap(
        &self,
        product: Product,
        choice: ColormapChoice,
        data_range: Option<(f32, f32)>,
    ) -> RenderResult<Colormap> {
        let key = choice.style_key(product);
        let def = match self.config.get_style(key) {
            Some(def) => def,
            None => {
                debug!(product = %product, "No style for product, using {}", FALLBACK_STYLE);
                self.config
                    .get_style(FALLBACK_STYLE)
                    .ok_or_else(|| RenderError::UnknownStyle(key.to_string()))?
            }
        };

        let mut colormap = Colormap::from_definition(def, data_range)?;
        if colormap.units.is_empty() {
            colormap.units = product.units().to_string();
        }
        Ok(colormap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(kind: &str, stops: &[(f32, &str)]) -> StyleDefinition {
        StyleDefinition {
            name: "test".to_string(),
            description: None,
            style_type: kind.to_string(),
            units: None,
            scale: None,
            stops: stops
                .iter()
                .map(|(v, c)| ColorStop {
                    value: *v,
                    color: c.to_string(),
                    label: None,
                })
                .collect(),
            interpolation: None,
            out_of_range: None,
        }
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF8000"), Some((255, 128, 0)));
        assert_eq!(hex_to_rgb("00ff00"), Some((0, 255, 0)));
        assert_eq!(hex_to_rgb("#FFF"), None);
        assert_eq!(hex_to_rgb("#GG0000"), None);
    }

    #[test]
    fn test_stepped_bands() {
        let def = style("stepped", &[(0.0, "#000000"), (10.0, "#FF0000"), (20.0, "#00FF00")]);
        let cmap = Colormap::from_definition(&def, None).unwrap();
        assert_eq!(cmap.color(5.0), Some([0, 0, 0]));
        assert_eq!(cmap.color(10.0), Some([255, 0, 0]));
        assert_eq!(cmap.color(19.9), Some([255, 0, 0]));
        assert_eq!(cmap.color(20.0), Some([0, 255, 0]));
    }

    #[test]
    fn test_gradient_interpolates() {
        let def = style("gradient", &[(0.0, "#000000"), (10.0, "#C8C8C8")]);
        let cmap = Colormap::from_definition(&def, None).unwrap();
        assert_eq!(cmap.color(5.0), Some([100, 100, 100]));
    }

    #[test]
    fn test_nan_is_transparent() {
        let def = style("gradient", &[(0.0, "#000000"), (10.0, "#FFFFFF")]);
        let cmap = Colormap::from_definition(&def, None).unwrap();
        assert_eq!(cmap.color(f32::NAN), None);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let def = style("gradient", &[(0.0, "#000000"), (10.0, "#FFFFFF")]);
        let cmap = Colormap::from_definition(&def, None).unwrap();
        assert_eq!(cmap.color(-50.0), Some([0, 0, 0]));
        assert_eq!(cmap.color(99.0), Some([255, 255, 255]));

        let mut def = def;
        def.out_of_range = Some("transparent".to_string());
        let cmap = Colormap::from_definition(&def, None).unwrap();
        assert_eq!(cmap.color(99.0), None);
    }

    #[test]
    fn test_data_scaled_style() {
        let mut def = style("gradient", &[(0.0, "#000000"), (1.0, "#FFFFFF")]);
        def.scale = Some("data".to_string());
        let cmap = Colormap::from_definition(&def, Some((-20.0, 20.0))).unwrap();
        assert_eq!(cmap.vmin(), -20.0);
        assert_eq!(cmap.vmax(), 20.0);

        let flat = Colormap::from_definition(&def, Some((3.0, 3.0))).unwrap();
        assert_eq!(flat.vmin(), 2.5);
        assert_eq!(flat.vmax(), 3.5);
    }

    #[test]
    fn test_invalid_styles_rejected() {
        assert!(Colormap::from_definition(&style("contour", &[(0.0, "#000000")]), None).is_err());
        assert!(Colormap::from_definition(&style("gradient", &[]), None).is_err());
        assert!(Colormap::from_definition(&style("gradient", &[(0.0, "blue")]), None).is_err());
        assert!(Colormap::from_definition(
            &style("gradient", &[(5.0, "#000000"), (1.0, "#FFFFFF")]),
            None
        )
        .is_err());
    }
}
