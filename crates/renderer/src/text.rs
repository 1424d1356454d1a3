//! TrueType text drawing.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

/// Font used when no configured or system font parses.
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Where to look for a sans-serif font when none is configured.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Horizontal anchor for [`TextRenderer::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Size, colour and anchor of a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgba<u8>,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgba<u8>, align: Align) -> Self {
        Self { size, color, align }
    }
}

/// Draws labels with an optional font.
///
/// Without a font every draw call is a no-op, so figures still render their
/// raster parts.
#[derive(Clone, Default)]
pub struct TextRenderer {
    font: Option<Font<'static>>,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl TextRenderer {
    /// A renderer that draws nothing.
    pub fn none() -> Self {
        Self { font: None }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font: Some(font) })
    }

    /// The font compiled into the crate.
    pub fn bundled() -> Self {
        Self {
            font: Font::try_from_bytes(FONT_DATA),
        }
    }

    /// Load the first candidate that parses as a font.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Option<Self> {
        for path in candidates {
            let path = path.as_ref();
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match Self::from_bytes(bytes) {
                Some(renderer) => {
                    debug!(path = %path.display(), "Loaded label font");
                    return Some(renderer);
                }
                None => warn!(path = %path.display(), "Failed to parse font file"),
            }
        }
        None
    }

    /// Configured paths first, then the platform defaults, then the bundled
    /// font.
    pub fn discover(configured: &[PathBuf]) -> Self {
        let mut candidates: Vec<PathBuf> = configured.to_vec();
        candidates.extend(DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from));
        Self::load(&candidates).unwrap_or_else(|| {
            debug!("No system font found, using bundled DejaVu Sans");
            Self::bundled()
        })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Advance width of `text` in pixels. Zero without a font.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let Some(font) = &self.font else {
            return 0.0;
        };
        font.layout(text, Scale::uniform(size), point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Draw one line of text with its top at `y`.
    pub fn draw(&self, image: &mut RgbaImage, text: &str, x: f32, y: f32, style: TextStyle) {
        let Some(font) = &self.font else {
            return;
        };
        let left = match style.align {
            Align::Left => x,
            Align::Center => x - self.text_width(text, style.size) / 2.0,
            Align::Right => x - self.text_width(text, style.size),
        };
        draw_text_mut(
            image,
            style.color,
            left.round() as i32,
            y.round() as i32,
            Scale::uniform(style.size),
            font,
            text,
        );
    }

    /// Draw text rotated a quarter turn counter-clockwise, centred on
    /// `(cx, cy)`. Used for the colorbar label.
    pub fn draw_vertical(
        &self,
        image: &mut RgbaImage,
        text: &str,
        cx: f32,
        cy: f32,
        size: f32,
        color: Rgba<u8>,
    ) {
        if self.font.is_none() || text.is_empty() {
            return;
        }
        let width = self.text_width(text, size).ceil().max(1.0) as u32;
        let height = (size * 1.3).ceil().max(1.0) as u32;
        let mut label = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        self.draw(&mut label, text, 0.0, 0.0, TextStyle::new(size, color, Align::Left));
        let rotated = image::imageops::rotate270(&label);
        let left = (cx - rotated.width() as f32 / 2.0).round() as i64;
        let top = (cy - rotated.height() as f32 / 2.0).round() as i64;
        image::imageops::overlay(image, &rotated, left, top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_is_noop() {
        assert!(TextRenderer::load(&["/nonexistent/font.ttf"]).is_none());
        let renderer = TextRenderer::none();
        let mut image = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let style = TextStyle::new(12.0, Rgba([0, 0, 0, 255]), Align::Left);
        renderer.draw(&mut image, "REF", 0.0, 0.0, style);
        assert!(image.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
        assert_eq!(renderer.text_width("REF", 12.0), 0.0);
    }

    #[test]
    fn test_bundled_font_draws() {
        let renderer = TextRenderer::bundled();
        assert!(renderer.has_font());
        assert!(renderer.text_width("REF", 12.0) > 0.0);
        let mut image = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
        let style = TextStyle::new(14.0, Rgba([0, 0, 0, 255]), Align::Left);
        renderer.draw(&mut image, "REF", 2.0, 2.0, style);
        assert!(image.pixels().any(|p| *p != Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_discover_falls_back_to_bundled() {
        let renderer = TextRenderer::discover(&[PathBuf::from("/nonexistent/font.ttf")]);
        assert!(renderer.has_font());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(TextRenderer::from_bytes(vec![0u8; 64]).is_none());
    }
}
