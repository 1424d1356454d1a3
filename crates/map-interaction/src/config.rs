//! Pan/zoom tuning.

use serde::{Deserialize, Serialize};

/// Configuration for the pan/zoom controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Extent scale per scroll tick; zoom-in divides by this.
    pub zoom_step: f64,
    /// Smallest longitude span a zoom may produce, degrees.
    pub min_lon_span: f64,
    /// Smallest latitude span a zoom may produce, degrees.
    pub min_lat_span: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            zoom_step: 1.2,
            min_lon_span: 0.01,
            min_lat_span: 0.01,
        }
    }
}

impl InteractionConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.zoom_step > 1.0) {
            return Err(format!("zoom_step must be greater than 1, got {}", self.zoom_step));
        }
        if !(self.min_lon_span > 0.0) || self.min_lon_span >= 360.0 {
            return Err(format!("min_lon_span must be in (0, 360), got {}", self.min_lon_span));
        }
        if !(self.min_lat_span > 0.0) || self.min_lat_span >= 180.0 {
            return Err(format!("min_lat_span must be in (0, 180), got {}", self.min_lat_span));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(InteractionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = InteractionConfig::default();
        config.zoom_step = 1.0;
        assert!(config.validate().is_err());

        let mut config = InteractionConfig::default();
        config.min_lat_span = 0.0;
        assert!(config.validate().is_err());

        let mut config = InteractionConfig::default();
        config.min_lon_span = f64::NAN;
        assert!(config.validate().is_err());
    }
}
