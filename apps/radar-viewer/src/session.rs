//! Document state behind the viewer window.
//!
//! [`ViewerSession`] owns everything the window shows but no window: the
//! loaded scan, the folder cursor, the tilt/product/range selection, the
//! single-shot QC override and the rendered map. The shell turns user actions
//! into calls here and shows the returned errors in dialogs.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use map_interaction::{Outcome, PanZoomController, PointerEvent, ScreenPoint};
use qc_filters::{attenuation_correction, clutter_filter, QcFilter};
use radar_common::{GeoExtent, GeoPoint, Grid2D, Product, RadarError, RadarResult};
use radar_io::{FileSequence, Scan, ScanLoader, StandardFormatLoader};
use renderer::{
    BoundaryLayer, Colormap, ColormapChoice, ColormapSet, DrawOptions, FigureSpec, MapFrame,
    PlotData, PlotRequest, RenderedMap, StyleConfig, TextRenderer, EXPORT_DPI,
};
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::surface::ViewerSurface;

const NO_FILE: &str = "Open a radar file first";
const NO_PLOT: &str = "Plot an image first";

/// What to plot from the current file. Survives folder stepping.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub tilt: usize,
    pub product: Option<Product>,
    /// Range field contents, parsed on each plot
    pub range_text: String,
}

#[derive(Debug)]
struct Document {
    path: PathBuf,
    file_name: String,
    scan: Scan,
}

/// A plotted sweep and its current drawing.
#[derive(Debug, Clone)]
pub struct MapView {
    plot: PlotData,
    colormap: Colormap,
    rendered: RenderedMap,
}

impl MapView {
    pub fn plot(&self) -> &PlotData {
        &self.plot
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn image(&self) -> &RgbaImage {
        &self.rendered.image
    }

    pub fn frame(&self) -> &MapFrame {
        &self.rendered.frame
    }

    pub fn extent(&self) -> GeoExtent {
        self.rendered.frame.extent()
    }
}

/// Parse the range field. Must be a finite number above zero.
pub fn parse_range(text: &str) -> RadarResult<f64> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| RadarError::InvalidRange(format!("range must be a number, got {:?}", trimmed)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(RadarError::InvalidRange(format!(
            "range must be greater than zero, got {}",
            trimmed
        )));
    }
    Ok(value)
}

/// Status bar text for a cursor position.
pub fn format_readout(point: GeoPoint) -> String {
    format!("Lon: {:.3}°, Lat: {:.3}°", point.lon, point.lat)
}

/// Body of the About dialog.
pub fn about_text() -> String {
    format!(
        "Radar Volume Viewer\nVersion: v{}\nDisplays X-band weather radar base data.",
        env!("CARGO_PKG_VERSION")
    )
}

pub struct ViewerSession {
    config: ViewerConfig,
    loader: Box<dyn ScanLoader>,
    styles: ColormapSet,
    text: TextRenderer,
    document: Option<Document>,
    sequence: Option<FileSequence>,
    selection: Selection,
    pending_override: Option<Grid2D>,
    view: Option<MapView>,
    controller: PanZoomController,
    boundary: Option<BoundaryLayer>,
    overlay_visible: bool,
    colormap_choice: ColormapChoice,
    status: String,
    revision: u64,
}

impl ViewerSession {
    /// Session reading standard-format files, with fonts and styles taken
    /// from the config.
    pub fn new(config: ViewerConfig) -> RadarResult<Self> {
        let text = TextRenderer::discover(&config.font_paths);
        Self::with_loader(config, Box::new(StandardFormatLoader::new()), text)
    }

    pub fn with_loader(
        config: ViewerConfig,
        loader: Box<dyn ScanLoader>,
        text: TextRenderer,
    ) -> RadarResult<Self> {
        let styles = load_styles(config.style_file.as_deref())?;
        Ok(Self {
            controller: PanZoomController::new(config.interaction),
            selection: Selection {
                tilt: 0,
                product: None,
                range_text: config.default_range_text(),
            },
            config,
            loader,
            styles,
            text,
            document: None,
            sequence: None,
            pending_override: None,
            view: None,
            boundary: None,
            overlay_visible: false,
            colormap_choice: ColormapChoice::default(),
            status: String::new(),
            revision: 0,
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn scan(&self) -> Option<&Scan> {
        self.document.as_ref().map(|d| &d.scan)
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.document.as_ref().map(|d| d.path.as_path())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.file_name.as_str())
    }

    /// Zero-based position and length of the open folder.
    pub fn sequence_position(&self) -> Option<(usize, usize)> {
        self.sequence.as_ref().map(|s| (s.position(), s.len()))
    }

    /// Products present at the selected tilt.
    pub fn products(&self) -> Vec<Product> {
        self.scan()
            .map(|scan| scan.available_products(self.selection.tilt))
            .unwrap_or_default()
    }

    pub fn view(&self) -> Option<&MapView> {
        self.view.as_ref()
    }

    /// Bumped whenever the view's image changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_pending_override(&self) -> bool {
        self.pending_override.is_some()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn colormap_choice(&self) -> ColormapChoice {
        self.colormap_choice
    }

    pub fn is_panning(&self) -> bool {
        self.controller.is_panning()
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    /// Open a single file. Leaves folder mode.
    ///
    /// On failure nothing changes.
    pub fn open_file(&mut self, path: &Path) -> RadarResult<()> {
        let document = self.load(path)?;
        self.sequence = None;
        self.install(document, false);
        self.status = format!("Loaded {}", self.file_name().unwrap_or_default());
        Ok(())
    }

    /// Open the first `.bz2` file of a folder and remember the rest.
    pub fn open_folder(&mut self, dir: &Path) -> RadarResult<()> {
        let sequence = FileSequence::from_dir(dir)?;
        let document = self.load(sequence.current())?;
        let count = sequence.len();
        self.sequence = Some(sequence);
        self.install(document, false);
        self.status = format!(
            "Loaded {} (1 of {})",
            self.file_name().unwrap_or_default(),
            count
        );
        Ok(())
    }

    /// Load the next file of the folder and plot it with the same selection.
    ///
    /// Returns `Ok(false)` at the end of the folder.
    pub fn next_file(&mut self) -> RadarResult<bool> {
        self.step(true)
    }

    pub fn previous_file(&mut self) -> RadarResult<bool> {
        self.step(false)
    }

    fn step(&mut self, forward: bool) -> RadarResult<bool> {
        let sequence = self
            .sequence
            .as_ref()
            .ok_or_else(|| RadarError::user_input("Open a folder first"))?;
        let path = match sequence.peek(forward) {
            Some(path) => path.to_path_buf(),
            None => {
                self.status = if forward {
                    "Already at the last file".to_string()
                } else {
                    "Already at the first file".to_string()
                };
                return Ok(false);
            }
        };

        // The cursor only moves once the neighbour has decoded
        let document = self.load(&path)?;
        if let Some(sequence) = self.sequence.as_mut() {
            if forward {
                sequence.next();
            } else {
                sequence.previous();
            }
        }
        self.install(document, true);
        self.plot()?;
        if let Some((position, count)) = self.sequence_position() {
            self.status = format!(
                "Showing {} ({} of {})",
                self.file_name().unwrap_or_default(),
                position + 1,
                count
            );
        }
        Ok(true)
    }

    fn load(&self, path: &Path) -> RadarResult<Document> {
        let scan = self.loader.load(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Document {
            path: path.to_path_buf(),
            file_name,
            scan,
        })
    }

    /// Make `document` current and fix up the selection for it.
    fn install(&mut self, document: Document, keep_selection: bool) {
        let scan = &document.scan;
        let tilt = if keep_selection && self.selection.tilt < scan.tilt_count() {
            self.selection.tilt
        } else {
            0
        };
        let products = scan.available_products(tilt);
        let product = match self.selection.product {
            Some(p) if keep_selection && products.contains(&p) => Some(p),
            _ => products.first().copied(),
        };
        if !keep_selection {
            self.selection.range_text = self.config.default_range_text();
        }
        self.selection.tilt = tilt;
        self.selection.product = product;

        debug!(
            file = %document.file_name,
            tilt = tilt,
            product = ?product,
            kept = keep_selection,
            "Applied selection"
        );

        self.document = Some(document);
        self.pending_override = None;
        self.view = None;
        self.controller = PanZoomController::new(self.config.interaction);
        self.revision += 1;
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Choose a tilt. The product falls back to the tilt's first one when
    /// the current product is missing there.
    pub fn select_tilt(&mut self, tilt: usize) -> RadarResult<()> {
        let scan = self.scan().ok_or_else(|| RadarError::user_input(NO_FILE))?;
        if tilt >= scan.tilt_count() {
            return Err(RadarError::user_input(format!(
                "Tilt {} does not exist (volume has {})",
                tilt,
                scan.tilt_count()
            )));
        }
        let products = scan.available_products(tilt);
        if !self
            .selection
            .product
            .map(|p| products.contains(&p))
            .unwrap_or(false)
        {
            self.selection.product = products.first().copied();
        }
        self.selection.tilt = tilt;
        Ok(())
    }

    pub fn select_product(&mut self, product: Product) -> RadarResult<()> {
        if self.scan().is_none() {
            return Err(RadarError::user_input(NO_FILE));
        }
        if !self.products().contains(&product) {
            return Err(RadarError::DataNotAvailable(format!(
                "{} at tilt {}",
                product, self.selection.tilt
            )));
        }
        self.selection.product = Some(product);
        Ok(())
    }

    pub fn set_range_text(&mut self, text: impl Into<String>) {
        self.selection.range_text = text.into();
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Render the current selection at its full extent.
    ///
    /// A pending QC override is used by the first call that gets past input
    /// validation and then dropped, whether the render succeeds or not. On
    /// failure the previous view stays.
    pub fn plot(&mut self) -> RadarResult<()> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| RadarError::user_input(NO_FILE))?;
        let product = self
            .selection
            .product
            .ok_or_else(|| RadarError::user_input("No product selected"))?;
        let range_km = parse_range(&self.selection.range_text)?;
        let override_values = self.pending_override.take();
        let used_override = override_values.is_some();

        let plot = PlotData::assemble(PlotRequest {
            scan: &document.scan,
            file_name: &document.file_name,
            tilt: self.selection.tilt,
            product,
            range_km,
            override_values,
        })?;
        let colormap = self
            .styles
            .colormap(product, self.colormap_choice, plot.data_range())?;
        let extent = plot.initial_extent();
        let rendered = self.render(&plot, &colormap, self.config.figure(), extent);

        info!(
            file = %document.file_name,
            tilt = self.selection.tilt,
            product = %product,
            range_km = range_km,
            qc_override = used_override,
            extent = %extent,
            "Plotted sweep"
        );

        self.controller.set_home(extent);
        self.view = Some(MapView {
            plot,
            colormap,
            rendered,
        });
        self.revision += 1;
        self.status = "Plot complete".to_string();
        Ok(())
    }

    /// Run a QC filter on the displayed product at the selected tilt and
    /// range, then plot its output in place of that product.
    pub fn apply_qc(&mut self, filter: QcFilter) -> RadarResult<()> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| RadarError::user_input(NO_FILE))?;
        let product = self
            .selection
            .product
            .ok_or_else(|| RadarError::user_input("No product selected"))?;
        let range_km = parse_range(&self.selection.range_text)?;
        let tilt = self.selection.tilt;
        let available = document.scan.available_products(tilt);
        let missing: Vec<&str> = filter
            .companion_products()
            .iter()
            .filter(|p| !available.contains(p))
            .map(Product::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(RadarError::DataNotAvailable(format!(
                "{} needs {} at tilt {}",
                filter.label(),
                missing.join(", "),
                tilt
            )));
        }

        let sweep = |product| {
            document
                .scan
                .sweep(tilt, range_km, product)
                .map(|s| s.values)
        };

        let input = sweep(product)?;
        let result = match filter {
            QcFilter::Clutter => {
                clutter_filter(&input, &sweep(Product::Vel)?, &sweep(Product::Sw)?)?
            }
            QcFilter::Attenuation => attenuation_correction(&input),
        };
        debug!(filter = %filter, product = %product, shape = ?result.shape(), tilt = tilt, "QC filter applied");

        self.pending_override = Some(result);
        self.plot()?;
        self.status = format!("{} applied", filter.label());
        Ok(())
    }

    /// Switch colormaps and redraw the current view in place.
    pub fn set_colormap(&mut self, choice: ColormapChoice) -> RadarResult<()> {
        self.colormap_choice = choice;
        let Some(view) = self.view.as_ref() else {
            return Ok(());
        };
        let colormap = self.styles.colormap(
            view.plot.product(),
            choice,
            view.plot.data_range(),
        )?;
        if let Some(view) = self.view.as_mut() {
            view.colormap = colormap;
        }
        self.redraw();
        Ok(())
    }

    /// Show or hide the boundary overlay. Returns the new visibility.
    ///
    /// A missing or unreadable boundary file leaves the overlay off.
    pub fn toggle_overlay(&mut self) -> RadarResult<bool> {
        if self.view.is_none() {
            return Err(RadarError::user_input(NO_PLOT));
        }
        if self.overlay_visible {
            self.overlay_visible = false;
            self.status = "Boundary overlay hidden".to_string();
        } else {
            if self.boundary.is_none() {
                self.boundary = self.load_boundary();
            }
            if self.boundary.is_none() {
                self.status = "Boundary overlay unavailable".to_string();
                return Ok(false);
            }
            self.overlay_visible = true;
            self.status = "Boundary overlay shown".to_string();
        }
        self.redraw();
        Ok(self.overlay_visible)
    }

    fn load_boundary(&self) -> Option<BoundaryLayer> {
        let Some(path) = self.config.boundary_file.as_deref() else {
            warn!("No boundary file configured, skipping overlay");
            return None;
        };
        match BoundaryLayer::from_file(path) {
            Ok(layer) => {
                info!(path = %path.display(), lines = layer.lines().len(), "Loaded boundary overlay");
                Some(layer)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load boundary overlay");
                None
            }
        }
    }

    /// Write the current view at export resolution.
    pub fn save_image(&mut self, path: &Path) -> RadarResult<PathBuf> {
        let view = self
            .view
            .as_ref()
            .ok_or_else(|| RadarError::user_input("No image to save"))?;
        let figure = self.config.figure().with_dpi(EXPORT_DPI);
        let rendered = self.render(&view.plot, &view.colormap, figure, view.extent());
        let written = rendered.save(path)?;
        self.status = format!("Image saved to {}", written.display());
        Ok(written)
    }

    fn render(
        &self,
        plot: &PlotData,
        colormap: &Colormap,
        figure: FigureSpec,
        extent: GeoExtent,
    ) -> RenderedMap {
        let overlay = if self.overlay_visible {
            self.boundary.as_ref()
        } else {
            None
        };
        plot.draw(&DrawOptions {
            figure,
            extent,
            colormap,
            overlay,
            text: &self.text,
        })
    }

    /// Redraw the view at its current extent.
    fn redraw(&mut self) {
        if let Some(extent) = self.view.as_ref().map(MapView::extent) {
            self.redraw_at(extent);
        }
    }

    fn redraw_at(&mut self, extent: GeoExtent) {
        let Some(view) = self.view.as_ref() else {
            return;
        };
        let rendered = self.render(&view.plot, &view.colormap, view.rendered.figure, extent);
        if let Some(view) = self.view.as_mut() {
            view.rendered = rendered;
            self.revision += 1;
        }
    }

    // ------------------------------------------------------------------------
    // Interaction
    // ------------------------------------------------------------------------

    /// Feed a pointer event in figure-pixel coordinates to the pan/zoom
    /// controller and redraw if the extent changed.
    pub fn pointer(&mut self, event: PointerEvent) -> Outcome {
        let Some(view) = self.view.as_ref() else {
            return Outcome::Ignored;
        };
        let mut surface = ViewerSurface::new(view.rendered.frame.clone());
        let outcome = self.controller.handle(&mut surface, event);
        if surface.needs_redraw() {
            self.redraw_at(surface.into_extent());
        }
        if let Outcome::Reset(_) = outcome {
            self.status = "View reset".to_string();
        }
        outcome
    }

    /// Geographic position under a figure pixel, if it lies on the map.
    pub fn cursor_position(&self, point: ScreenPoint) -> Option<GeoPoint> {
        let frame = self.view.as_ref()?.frame();
        if !frame.contains_pixel(point.x, point.y) {
            return None;
        }
        frame.pixel_to_geo(point.x, point.y).filter(GeoPoint::is_finite)
    }
}

fn load_styles(style_file: Option<&Path>) -> RadarResult<ColormapSet> {
    if let Some(path) = style_file {
        match StyleConfig::from_file(path) {
            Ok(config) => {
                info!(path = %path.display(), styles = config.styles.len(), "Loaded colormap styles");
                return Ok(ColormapSet::new(config));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load style file, using built-in styles");
            }
        }
    }
    Ok(ColormapSet::embedded()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("75").unwrap(), 75.0);
        assert_eq!(parse_range(" 37.5 ").unwrap(), 37.5);
        assert!(matches!(parse_range("abc"), Err(RadarError::InvalidRange(_))));
        assert!(matches!(parse_range(""), Err(RadarError::InvalidRange(_))));
        assert!(matches!(parse_range("0"), Err(RadarError::InvalidRange(_))));
        assert!(matches!(parse_range("-10"), Err(RadarError::InvalidRange(_))));
        assert!(matches!(parse_range("inf"), Err(RadarError::InvalidRange(_))));
        assert!(matches!(parse_range("NaN"), Err(RadarError::InvalidRange(_))));
    }

    #[test]
    fn test_readout_format() {
        assert_eq!(
            format_readout(GeoPoint::new(113.35549, 23.0041)),
            "Lon: 113.355°, Lat: 23.004°"
        );
    }

    #[test]
    fn test_override_consumed_when_plot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_utils::SyntheticVolume::two_tilt(36, 40)
            .write_to(dir.path(), "Z9200.bin", test_utils::Wrapping::Raw)
            .unwrap();
        let mut session = ViewerSession::new(ViewerConfig::default()).unwrap();
        session.open_file(&path).unwrap();
        session.set_range_text("30");

        session.pending_override = Some(Grid2D::filled(36, 29, 1.0));
        let err = session.plot().unwrap_err();
        assert!(matches!(
            err,
            RadarError::ShapeMismatch {
                expected: (36, 30),
                actual: (36, 29)
            }
        ));
        assert!(session.pending_override.is_none());
        assert!(session.view.is_none());

        // Next attempt draws the scan's own values
        session.plot().unwrap();
        assert!(session.view.is_some());
    }

    #[test]
    fn test_override_kept_through_input_errors() {
        let mut session = ViewerSession::new(ViewerConfig::default()).unwrap();
        session.pending_override = Some(Grid2D::filled(36, 30, 1.0));
        let err = session.plot().unwrap_err();
        assert_eq!(err.kind(), radar_common::ErrorKind::UserInput);
        assert!(session.pending_override.is_some());

        let dir = tempfile::tempdir().unwrap();
        let path = test_utils::SyntheticVolume::two_tilt(36, 40)
            .write_to(dir.path(), "Z9200.bin", test_utils::Wrapping::Raw)
            .unwrap();
        session.open_file(&path).unwrap();
        session.pending_override = Some(Grid2D::filled(36, 30, 1.0));
        session.set_range_text("abc");
        assert!(matches!(session.plot(), Err(RadarError::InvalidRange(_))));
        assert!(session.pending_override.is_some());

        session.set_range_text("30");
        session.plot().unwrap();
        assert!(session.pending_override.is_none());
        assert_eq!(session.view().unwrap().plot().data_range(), Some((1.0, 1.0)));
    }

    #[test]
    fn test_about_text_has_version() {
        assert!(about_text().contains(env!("CARGO_PKG_VERSION")));
    }
}
