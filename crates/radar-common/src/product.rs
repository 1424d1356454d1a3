//! Radar data products (moments).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A physical quantity measured per radar gate.
///
/// Declaration order follows the standard-format data type codes, which is
/// also the order products are listed in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Product {
    /// Total (unfiltered) reflectivity.
    Tref,
    /// Reflectivity.
    Ref,
    /// Radial velocity.
    Vel,
    /// Spectrum width.
    Sw,
    /// Signal quality index.
    Sqi,
    /// Clutter phase alignment.
    Cpa,
    /// Differential reflectivity.
    Zdr,
    /// Linear depolarization ratio.
    Ldr,
    /// Cross-correlation coefficient.
    Rho,
    /// Differential phase.
    Phi,
    /// Specific differential phase.
    Kdp,
}

impl Product {
    pub const ALL: [Product; 11] = [
        Product::Tref,
        Product::Ref,
        Product::Vel,
        Product::Sw,
        Product::Sqi,
        Product::Cpa,
        Product::Zdr,
        Product::Ldr,
        Product::Rho,
        Product::Phi,
        Product::Kdp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Tref => "TREF",
            Product::Ref => "REF",
            Product::Vel => "VEL",
            Product::Sw => "SW",
            Product::Sqi => "SQI",
            Product::Cpa => "CPA",
            Product::Zdr => "ZDR",
            Product::Ldr => "LDR",
            Product::Rho => "RHO",
            Product::Phi => "PHI",
            Product::Kdp => "KDP",
        }
    }

    /// Unit string used on colorbars.
    pub fn units(&self) -> &'static str {
        match self {
            Product::Tref | Product::Ref | Product::Zdr | Product::Ldr => "dB",
            Product::Vel | Product::Sw => "m/s",
            Product::Phi => "deg",
            Product::Kdp => "deg/km",
            Product::Sqi | Product::Cpa | Product::Rho => "",
        }
    }

    /// Standard-format moment data type code.
    pub fn code(&self) -> u32 {
        match self {
            Product::Tref => 1,
            Product::Ref => 2,
            Product::Vel => 3,
            Product::Sw => 4,
            Product::Sqi => 5,
            Product::Cpa => 6,
            Product::Zdr => 7,
            Product::Ldr => 8,
            Product::Rho => 9,
            Product::Phi => 10,
            Product::Kdp => 11,
        }
    }

    pub fn from_code(code: u32) -> Option<Product> {
        Product::ALL.iter().copied().find(|p| p.code() == code)
    }

    /// Reflectivity moments are sampled at the log (intensity) resolution.
    pub fn is_reflectivity(&self) -> bool {
        matches!(self, Product::Tref | Product::Ref)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown product: {0}")]
pub struct ProductParseError(pub String);

impl FromStr for Product {
    type Err = ProductParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Product::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == upper)
            .ok_or_else(|| ProductParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("ref".parse::<Product>().unwrap(), Product::Ref);
        assert_eq!(" KDP ".parse::<Product>().unwrap(), Product::Kdp);
        assert!("XYZ".parse::<Product>().is_err());
    }

    #[test]
    fn test_codes_round_trip() {
        for product in Product::ALL {
            assert_eq!(Product::from_code(product.code()), Some(product));
        }
        assert_eq!(Product::from_code(0), None);
        assert_eq!(Product::from_code(12), None);
    }

    #[test]
    fn test_ordering_follows_codes() {
        let mut shuffled = vec![Product::Kdp, Product::Ref, Product::Tref, Product::Vel];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Product::Tref, Product::Ref, Product::Vel, Product::Kdp]
        );
    }
}
