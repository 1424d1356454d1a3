//! Figure composition: title, projected sweep, gridline labels, colorbar.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use projection::AzimuthalEquidistant;
use radar_common::{GeoExtent, Grid2D, Product};
use radar_io::{Scan, SweepData};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::colormap::Colormap;
use crate::error::{RenderError, RenderResult};
use crate::export::save_image;
use crate::map_frame::{MapFrame, PlotRect};
use crate::overlay::BoundaryLayer;
use crate::png::create_png;
use crate::raster::rasterize_sweep;
use crate::text::{Align, TextRenderer, TextStyle};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

// Layout in inches
const MARGIN_LEFT: f32 = 0.8;
const MARGIN_TOP: f32 = 0.75;
const MARGIN_BOTTOM: f32 = 0.45;
const MARGIN_RIGHT: f32 = 1.1;
const COLORBAR_GAP: f32 = 0.15;
const COLORBAR_WIDTH: f32 = 0.18;

// Font sizes in points
const TITLE_PT: f32 = 12.0;
const LABEL_PT: f32 = 9.0;

/// Physical size and resolution of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    pub width_in: f32,
    pub height_in: f32,
    pub dpi: f32,
}

impl Default for FigureSpec {
    fn default() -> Self {
        Self {
            width_in: 6.0,
            height_in: 6.0,
            dpi: 100.0,
        }
    }
}

impl FigureSpec {
    pub fn new(width_in: f32, height_in: f32, dpi: f32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    pub fn with_dpi(self, dpi: f32) -> Self {
        Self { dpi, ..self }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi).round().max(1.0) as u32,
            (self.height_in * self.dpi).round().max(1.0) as u32,
        )
    }

    fn px(&self, inches: f32) -> u32 {
        (inches * self.dpi).round().max(0.0) as u32
    }

    /// Font size in pixels for a size in points.
    fn font_px(&self, points: f32) -> f32 {
        points * self.dpi / 72.0
    }

    pub fn layout(&self) -> FigureLayout {
        let (width, height) = self.pixel_size();
        let left = self.px(MARGIN_LEFT);
        let top = self.px(MARGIN_TOP);
        let plot_w = width.saturating_sub(left + self.px(MARGIN_RIGHT)).max(1);
        let plot_h = height.saturating_sub(top + self.px(MARGIN_BOTTOM)).max(1);
        let plot = PlotRect::new(left, top, plot_w, plot_h);
        let colorbar = PlotRect::new(
            plot.right() + self.px(COLORBAR_GAP),
            top,
            self.px(COLORBAR_WIDTH).max(1),
            plot_h,
        );
        FigureLayout { plot, colorbar }
    }
}

/// Pixel rectangles of the figure parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureLayout {
    pub plot: PlotRect,
    pub colorbar: PlotRect,
}

/// What to plot.
#[derive(Debug, Clone)]
pub struct PlotRequest<'a> {
    pub scan: &'a Scan,
    /// Shown on the first title line
    pub file_name: &'a str,
    pub tilt: usize,
    pub product: Product,
    pub range_km: f64,
    /// Replaces the scan's values; must match their shape
    pub override_values: Option<Grid2D>,
}

/// A sweep ready to draw at any extent.
#[derive(Debug, Clone)]
pub struct PlotData {
    sweep: SweepData,
    title: String,
    initial_extent: GeoExtent,
    projection: AzimuthalEquidistant,
}

impl PlotData {
    pub fn assemble(request: PlotRequest<'_>) -> RenderResult<Self> {
        let PlotRequest {
            scan,
            file_name,
            tilt,
            product,
            range_km,
            override_values,
        } = request;

        let mut sweep = scan.sweep(tilt, range_km, product)?;
        if let Some(values) = override_values {
            sweep.values.ensure_same_shape(&values)?;
            sweep.values = values;
        }
        let initial_extent = sweep.extent().ok_or(RenderError::NoExtent)?;

        Ok(Self {
            title: plot_title(file_name, product, sweep.elevation, range_km),
            projection: AzimuthalEquidistant::new(scan.site.longitude, scan.site.latitude),
            sweep,
            initial_extent,
        })
    }

    pub fn sweep(&self) -> &SweepData {
        &self.sweep
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn product(&self) -> Product {
        self.sweep.product
    }

    /// Bounding box of the gate positions.
    pub fn initial_extent(&self) -> GeoExtent {
        self.initial_extent
    }

    pub fn data_range(&self) -> Option<(f32, f32)> {
        self.sweep.values.finite_range()
    }

    /// Where the plot area lands in `figure`.
    pub fn frame(&self, figure: &FigureSpec, extent: GeoExtent) -> MapFrame {
        MapFrame::new(figure.layout().plot, self.projection, extent)
    }

    pub fn draw(&self, options: &DrawOptions<'_>) -> RenderedMap {
        let figure = options.figure;
        let (width, height) = figure.pixel_size();
        let layout = figure.layout();
        let frame = MapFrame::new(layout.plot, self.projection, options.extent);

        let mut image = RgbaImage::from_pixel(width, height, WHITE);

        let mut layer = rasterize_sweep(&self.sweep, options.colormap, &frame);
        if let Some(boundaries) = options.overlay {
            let thickness = (figure.dpi / 100.0).round().max(1.0) as u32;
            boundaries.draw(&mut layer, &frame, BLACK, thickness);
        }
        image::imageops::overlay(&mut image, &layer, layout.plot.x as i64, layout.plot.y as i64);
        draw_frame_border(&mut image, &layout.plot);

        self.draw_title(&mut image, &figure, &layout, options.text);
        draw_gridline_labels(&mut image, &figure, &frame, options.text);
        draw_colorbar(
            &mut image,
            &figure,
            &layout.colorbar,
            options.colormap,
            self.sweep.product.as_str(),
            options.text,
        );

        info!(
            product = %self.sweep.product,
            width = width,
            height = height,
            extent = %options.extent,
            "Rendered figure"
        );

        RenderedMap {
            image,
            frame,
            figure,
        }
    }

    fn draw_title(&self, image: &mut RgbaImage, figure: &FigureSpec, layout: &FigureLayout, text: &TextRenderer) {
        let size = figure.font_px(TITLE_PT);
        let line_height = size * 1.25;
        let cx = layout.plot.x as f32 + layout.plot.width as f32 / 2.0;
        let lines: Vec<&str> = self.title.lines().collect();
        let bottom = layout.plot.y as f32 - size * 0.4;
        let top = bottom - line_height * lines.len() as f32;
        let style = TextStyle::new(size, BLACK, Align::Center);
        for (i, line) in lines.iter().enumerate() {
            text.draw(image, line, cx, top + i as f32 * line_height, style);
        }
    }
}

/// Everything a draw needs besides the data.
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions<'a> {
    pub figure: FigureSpec,
    pub extent: GeoExtent,
    pub colormap: &'a Colormap,
    pub overlay: Option<&'a BoundaryLayer>,
    pub text: &'a TextRenderer,
}

/// A composed figure and the frame its plot area was drawn with.
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub image: RgbaImage,
    pub frame: MapFrame,
    pub figure: FigureSpec,
}

impl RenderedMap {
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        create_png(
            self.image.as_raw(),
            self.image.width() as usize,
            self.image.height() as usize,
            Some(self.figure.dpi),
        )
    }

    /// Write as PNG or JPEG depending on the extension. Returns the path
    /// actually written.
    pub fn save(&self, path: &Path) -> RenderResult<PathBuf> {
        save_image(&self.image, path, self.figure.dpi)
    }
}

/// Two-line plot title.
pub fn plot_title(file_name: &str, product: Product, elevation: f64, range_km: f64) -> String {
    format!(
        "{}\n{} @ {:.1}° ({} km)",
        file_name, product, elevation, range_km
    )
}

fn draw_frame_border(image: &mut RgbaImage, rect: &PlotRect) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    draw_hollow_rect_mut(
        image,
        Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
        BLACK,
    );
}

/// Latitude labels on the left edge and longitude labels on the bottom edge,
/// placed where each parallel or meridian crosses that edge.
fn draw_gridline_labels(image: &mut RgbaImage, figure: &FigureSpec, frame: &MapFrame, text: &TextRenderer) {
    let rect = frame.rect();
    let size = figure.font_px(LABEL_PT);
    let tick_len = figure.px(0.05) as f32;
    let pad = figure.px(0.04) as f32;

    // Left edge, top to bottom
    let left_x = rect.x as f64;
    let left: Vec<(f64, f64)> = (rect.y..=rect.bottom())
        .filter_map(|py| frame.pixel_to_geo(left_x, py as f64).map(|g| (py as f64, g.lat)))
        .collect();
    let style = TextStyle::new(size, BLACK, Align::Right);
    for (py, tick) in edge_crossings(&left) {
        let y = py as f32;
        draw_line_segment_mut(image, (left_x as f32 - tick_len, y), (left_x as f32, y), BLACK);
        text.draw(
            image,
            &format_latitude(tick.0, tick.1),
            left_x as f32 - tick_len - pad,
            y - size / 2.0,
            style,
        );
    }

    // Bottom edge, left to right
    let bottom_y = rect.bottom() as f64;
    let bottom: Vec<(f64, f64)> = (rect.x..=rect.right())
        .filter_map(|px| frame.pixel_to_geo(px as f64, bottom_y).map(|g| (px as f64, g.lon)))
        .collect();
    let style = TextStyle::new(size, BLACK, Align::Center);
    for (px, tick) in edge_crossings(&bottom) {
        let x = px as f32;
        let y = bottom_y as f32;
        draw_line_segment_mut(image, (x, y), (x, y + tick_len), BLACK);
        text.draw(image, &format_longitude(tick.0, tick.1), x, y + tick_len + pad, style);
    }
}

/// Pixel positions where samples `(pixel, coordinate)` cross a nice tick
/// value. Returns `(pixel, (tick, step))`.
fn edge_crossings(samples: &[(f64, f64)]) -> Vec<(f64, (f64, f64))> {
    let (lo, hi) = samples
        .iter()
        .map(|s| s.1)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(hi > lo) {
        return Vec::new();
    }
    let step = nice_step(hi - lo, 5);
    let mut out = Vec::new();
    for tick in nice_ticks(lo, hi, step) {
        let crossing = samples.windows(2).find_map(|w| {
            let (a, b) = (w[0], w[1]);
            let (da, db) = (a.1 - tick, b.1 - tick);
            if da == 0.0 {
                Some(a.0)
            } else if da * db < 0.0 {
                Some(a.0 + (b.0 - a.0) * da / (da - db))
            } else {
                None
            }
        });
        if let Some(pixel) = crossing {
            out.push((pixel, (tick, step)));
        }
    }
    out
}

fn draw_colorbar(
    image: &mut RgbaImage,
    figure: &FigureSpec,
    bar: &PlotRect,
    colormap: &Colormap,
    label: &str,
    text: &TextRenderer,
) {
    if bar.height == 0 || bar.width == 0 {
        return;
    }
    let (img_w, img_h) = image.dimensions();
    let denom = (bar.height.max(2) - 1) as f32;
    for row in 0..bar.height {
        let t = 1.0 - row as f32 / denom;
        let [r, g, b] = colormap.color_at_fraction(t);
        let y = bar.y + row;
        for x in bar.x..bar.right() {
            if x < img_w && y < img_h {
                image.put_pixel(x, y, Rgba([r, g, b, 255]));
            }
        }
    }
    draw_frame_border(image, bar);

    let size = figure.font_px(LABEL_PT);
    let tick_len = figure.px(0.05) as f32;
    let pad = figure.px(0.04) as f32;
    let (vmin, vmax) = (colormap.vmin() as f64, colormap.vmax() as f64);
    let right = bar.right() as f32;
    let mut widest: f32 = 0.0;

    if vmax > vmin {
        let step = nice_step(vmax - vmin, 6);
        let style = TextStyle::new(size, BLACK, Align::Left);
        for tick in nice_ticks(vmin, vmax, step) {
            let frac = ((tick - vmin) / (vmax - vmin)) as f32;
            let y = bar.y as f32 + (1.0 - frac) * denom;
            draw_line_segment_mut(image, (right, y), (right + tick_len, y), BLACK);
            let label = format_number(tick, step);
            widest = widest.max(text.text_width(&label, size));
            text.draw(image, &label, right + tick_len + pad, y - size / 2.0, style);
        }
    }

    let label_x = right + tick_len + pad + widest + pad + size * 0.6;
    let label_y = bar.y as f32 + bar.height as f32 / 2.0;
    text.draw_vertical(image, label, label_x, label_y, size, BLACK);
}

fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let norm = raw / magnitude;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 2.5 {
        2.5
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Multiples of `step` within `[lo, hi]`.
fn nice_ticks(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let first = (lo / step).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn decimals_for(step: f64) -> usize {
    (0..=4)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(4)
}

fn format_number(value: f64, step: f64) -> String {
    let value = if value.abs() < step * 1e-9 { 0.0 } else { value };
    format!("{:.*}", decimals_for(step), value)
}

fn format_latitude(value: f64, step: f64) -> String {
    let text = format_number(value.abs(), step);
    if value.abs() < step * 1e-9 {
        format!("{}°", text)
    } else if value > 0.0 {
        format!("{}°N", text)
    } else {
        format!("{}°S", text)
    }
}

fn format_longitude(value: f64, step: f64) -> String {
    let wrapped = projection::azimuthal::normalize_lon(value);
    let text = format_number(wrapped.abs(), step);
    if wrapped.abs() < step * 1e-9 || (wrapped.abs() - 180.0).abs() < step * 1e-9 {
        format!("{}°", text)
    } else if wrapped > 0.0 {
        format!("{}°E", text)
    } else {
        format!("{}°W", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_format() {
        assert_eq!(
            plot_title("Z9200.bin.bz2", Product::Ref, 0.4834, 75.0),
            "Z9200.bin.bz2\nREF @ 0.5° (75 km)"
        );
        assert_eq!(
            plot_title("a.bin", Product::Vel, 1.5, 12.5),
            "a.bin\nVEL @ 1.5° (12.5 km)"
        );
    }

    #[test]
    fn test_pixel_size_scales_with_dpi() {
        let spec = FigureSpec::default();
        assert_eq!(spec.pixel_size(), (600, 600));
        assert_eq!(spec.with_dpi(300.0).pixel_size(), (1800, 1800));
    }

    #[test]
    fn test_layout_fits_figure() {
        for dpi in [72.0, 100.0, 300.0] {
            let spec = FigureSpec::default().with_dpi(dpi);
            let (w, h) = spec.pixel_size();
            let layout = spec.layout();
            assert!(layout.colorbar.x > layout.plot.right());
            assert!(layout.colorbar.right() < w);
            assert!(layout.plot.bottom() < h);
        }
    }

    #[test]
    fn test_nice_steps() {
        assert_eq!(nice_step(1.4, 5), 0.5);
        assert_eq!(nice_step(75.0, 6), 20.0);
        assert_eq!(nice_step(60.0, 6), 10.0);
        assert_eq!(nice_ticks(112.62, 114.09, 0.5), vec![113.0, 113.5, 114.0]);
    }

    #[test]
    fn test_coordinate_labels() {
        assert_eq!(format_latitude(23.5, 0.5), "23.5°N");
        assert_eq!(format_latitude(-10.0, 5.0), "10°S");
        assert_eq!(format_latitude(0.0, 1.0), "0°");
        assert_eq!(format_longitude(113.0, 1.0), "113°E");
        assert_eq!(format_longitude(-75.25, 0.25), "75.25°W");
        assert_eq!(format_longitude(180.0, 10.0), "180°");
        assert_eq!(format_number(2.5, 2.5), "2.5");
    }

    #[test]
    fn test_edge_crossings_interpolate() {
        let samples: Vec<(f64, f64)> = (0..=100).map(|i| (i as f64, 22.9 + i as f64 * 0.004)).collect();
        let crossings = edge_crossings(&samples);
        assert!(!crossings.is_empty());
        for (pixel, (tick, _)) in crossings {
            let expected = (tick - 22.9) / 0.004;
            assert!((pixel - expected).abs() < 1e-6);
        }
    }
}
