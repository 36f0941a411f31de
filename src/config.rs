// Pipeline configuration for exception detection and trend review
//
// All numeric constants of the pipeline live here so a line with different
// sensor calibration or review policy can be handled from a TOML file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the detection pipeline
///
/// # Example
/// ```
/// use catex::config::CatexConfig;
///
/// let config = CatexConfig::default();
/// assert_eq!(config.chain_length, 0.002); // 2 metres, in km
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatexConfig {
    /// Gap (km) at or below which adjacent runs are merged into one exception
    pub chain_length: f64,

    /// Contact-wire heights below this (mm) are treated as sensor faults
    ///
    /// A location with any channel under the floor is dropped from both
    /// height categories.
    pub height_floor_mm: f64,

    /// Offset (mm) added to raw height channels to get absolute height
    pub height_offset_mm: f64,

    /// Decimal places kept on chainage after `KM + LOCATION * 0.001`
    pub location_decimals: u32,

    /// Sections that are not split into zones (only class and default bounds apply)
    pub unzoned_sections: Vec<String>,

    /// Wire wear L2 review policy
    pub trend: TrendConfig,
}

impl Default for CatexConfig {
    fn default() -> Self {
        Self {
            chain_length: 0.002,
            height_floor_mm: 3500.0,
            height_offset_mm: 5300.0,
            location_decimals: 5,
            unzoned_sections: vec!["LMC".to_string(), "RAC".to_string(), "LOW".to_string()],
            trend: TrendConfig::default(),
        }
    }
}

/// Decision policy for wire wear L2 trend review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Fitted day-0 remaining thickness (mm) at or below which the L2 is real
    pub confirmation_floor: f64,

    /// Allowed gap (mm) between the latest reading and the day-0 fit
    pub tolerance: f64,

    /// Furthest (m) a raw catenary reading may sit from the exception's
    /// representative location when used as a fallback observation
    pub fallback_max_distance: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            confirmation_floor: 10.2,
            tolerance: 0.2,
            fallback_max_distance: 1.0,
        }
    }
}

impl CatexConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
        Ok(config)
    }

    /// Whether a section skips zone assignment
    pub fn is_unzoned(&self, section: &str) -> bool {
        self.unzoned_sections.iter().any(|s| s == section)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.chain_length > 0.0 && self.chain_length.is_finite()) {
            return Err(format!(
                "chain_length must be positive, got {}",
                self.chain_length
            ));
        }

        if !self.height_floor_mm.is_finite() || !self.height_offset_mm.is_finite() {
            return Err("height_floor_mm and height_offset_mm must be finite".to_string());
        }

        if self.location_decimals > 9 {
            return Err(format!(
                "location_decimals must be <= 9, got {}",
                self.location_decimals
            ));
        }

        if self.unzoned_sections.iter().any(|s| s.trim().is_empty()) {
            return Err("unzoned_sections must not contain empty names".to_string());
        }

        if self.trend.tolerance < 0.0 {
            return Err(format!(
                "trend.tolerance must be non-negative, got {}",
                self.trend.tolerance
            ));
        }

        if self.trend.fallback_max_distance < 0.0 {
            return Err(format!(
                "trend.fallback_max_distance must be non-negative, got {}",
                self.trend.fallback_max_distance
            ));
        }

        Ok(())
    }
}
