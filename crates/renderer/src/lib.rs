//! Figure rendering for radar sweeps.
//!
//! Turns a gridded sweep into an RGBA figure:
//! - Colormaps from JSON styles ([`ColormapSet`])
//! - Azimuthal-equidistant plot area ([`MapFrame`]), rasterised in parallel
//! - Title, gridline labels and colorbar ([`PlotData::draw`])
//! - Optional GeoJSON boundary overlay ([`BoundaryLayer`])
//! - PNG/JPEG export with embedded resolution ([`save_image`])

pub mod colormap;
pub mod error;
pub mod export;
pub mod figure;
pub mod map_frame;
pub mod overlay;
pub mod png;
pub mod raster;
pub mod text;

pub use colormap::{Colormap, ColormapChoice, ColormapSet, StyleConfig};
pub use error::{RenderError, RenderResult};
pub use export::{save_image, ExportFormat, EXPORT_DPI};
pub use figure::{DrawOptions, FigureSpec, PlotData, PlotRequest, RenderedMap};
pub use map_frame::{MapFrame, PlotRect};
pub use overlay::BoundaryLayer;
pub use text::TextRenderer;
