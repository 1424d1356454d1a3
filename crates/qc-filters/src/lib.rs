//! Quality-control transforms over a single sweep.
//!
//! Both filters are stateless: they take grids and return a new grid. The
//! input is whichever product is on display, and the result replaces that
//! product's values for one render.

pub mod attenuation;
pub mod clutter;
pub mod gaussian;

use std::fmt;

use radar_common::Product;

pub use attenuation::attenuation_correction;
pub use clutter::{clutter_filter, mask_clutter};
pub use gaussian::gaussian_filter;

/// The QC transforms the viewer offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QcFilter {
    Clutter,
    Attenuation,
}

impl QcFilter {
    pub const ALL: [QcFilter; 2] = [QcFilter::Clutter, QcFilter::Attenuation];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            QcFilter::Clutter => "Clutter Filter",
            QcFilter::Attenuation => "Attenuation Correction",
        }
    }

    /// Co-located products read alongside the one being filtered.
    pub fn companion_products(&self) -> &'static [Product] {
        match self {
            QcFilter::Clutter => &[Product::Vel, Product::Sw],
            QcFilter::Attenuation => &[],
        }
    }
}

impl fmt::Display for QcFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_companion_products() {
        assert_eq!(QcFilter::Clutter.companion_products(), &[Product::Vel, Product::Sw]);
        assert!(QcFilter::Attenuation.companion_products().is_empty());
    }
}
