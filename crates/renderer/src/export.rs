//! Writing rendered figures to disk.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ColorType, RgbaImage};
use tracing::info;

use crate::error::{RenderError, RenderResult};
use crate::png::create_png;

/// Resolution of saved images.
pub const EXPORT_DPI: f32 = 300.0;

const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }
}

/// The path an export will really be written to, and its format.
///
/// Paths without a `.png`, `.jpg` or `.jpeg` extension get `.png` appended.
pub fn resolve_export_path(path: &Path) -> (PathBuf, ExportFormat) {
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_extension);
    match format {
        Some(format) => (path.to_path_buf(), format),
        None => {
            let mut name = OsString::from(path.as_os_str());
            name.push(".png");
            (PathBuf::from(name), ExportFormat::Png)
        }
    }
}

/// Encode an image with its resolution recorded in the file.
pub fn encode_image(image: &RgbaImage, format: ExportFormat, dpi: f32) -> RenderResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    match format {
        ExportFormat::Png => create_png(image.as_raw(), width as usize, height as usize, Some(dpi)),
        ExportFormat::Jpeg => {
            // JPEG has no alpha; figures are opaque so the channel is dropped
            let rgb: Vec<u8> = image
                .as_raw()
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect();
            let density = dpi.round().clamp(1.0, u16::MAX as f32) as u16;
            let mut out = Vec::new();
            {
                let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
                encoder.set_pixel_density(PixelDensity::dpi(density));
                encoder.encode(&rgb, width, height, ColorType::Rgb8)?;
            }
            Ok(out)
        }
    }
}

/// Save as PNG or JPEG depending on the extension. Returns the path written.
pub fn save_image(image: &RgbaImage, path: &Path, dpi: f32) -> RenderResult<PathBuf> {
    let (path, format) = resolve_export_path(path);
    if image.width() == 0 || image.height() == 0 {
        return Err(RenderError::Encode("image is empty".to_string()));
    }
    let bytes = encode_image(image, format, dpi)?;
    fs::write(&path, &bytes)?;
    info!(path = %path.display(), format = ?format, dpi = dpi, bytes = bytes.len(), "Saved image");
    Ok(path)
}
