//! Export configuration.
//!
//! Hosts may embed the settings in their own TOML config:
//!
//! ```
//! use mandala_export::ExportConfig;
//!
//! let config = ExportConfig::from_toml_str("scale = 3.0\nfilename = \"goals.png\"")?;
//! assert_eq!(config.scale, 3.0);
//! assert_eq!(config.filename, "goals.png");
//! assert_eq!(config.grid_marker, "interactive-grid");
//! # Ok::<(), mandala_export::ConfigError>(())
//! ```

use crate::error::ConfigError;
use mandala_dom::GRID_MARKER;
use serde::{Deserialize, Serialize};

/// Filename of the saved chart.
pub const DEFAULT_FILENAME: &str = "mandala-chart.png";

/// Background given to cells without an inline background.
pub const DEFAULT_CELL_BACKGROUND: &str = "#ffffff";

/// Settings for one export pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output pixels per layout pixel
    pub scale: f32,
    /// Canvas background; `None` is transparent
    pub background: Option<String>,
    /// Allow images from other origins
    pub allow_cross_origin: bool,
    /// Name of the saved file
    pub filename: String,
    /// Class marker used to find the grid in the cloned document
    pub grid_marker: String,
    /// Background of cells that carry none inline
    pub fallback_cell_background: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: None,
            allow_cross_origin: true,
            filename: DEFAULT_FILENAME.to_string(),
            grid_marker: GRID_MARKER.to_string(),
            fallback_cell_background: DEFAULT_CELL_BACKGROUND.to_string(),
        }
    }
}

impl ExportConfig {
    /// Parse from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if self.filename.is_empty() {
            return Err(ConfigError::EmptyFilename);
        }
        Ok(())
    }

    /// The options handed to the rasterizer.
    #[must_use]
    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            scale: self.scale,
            background: self.background.clone(),
            allow_cross_origin: self.allow_cross_origin,
        }
    }
}

/// What the rasterizer needs to know about one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Output pixels per layout pixel
    pub scale: f32,
    /// Canvas background; `None` is transparent
    pub background: Option<String>,
    /// Allow images from other origins
    pub allow_cross_origin: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        ExportConfig::default().raster_options()
    }
}
