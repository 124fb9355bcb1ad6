//! # Detailing Settings
//!
//! Engineering defaults used when deriving cut lengths and block counts:
//! concrete cover, lap allowances, default stirrup spacing, the stock cut
//! cap for main bars and the CMU block face size.
//!
//! One [`DetailingConfig`] exists per unit system so that every constant is
//! expressed in the same unit as the geometry it is combined with.
//!
//! ## TOML Format
//!
//! Every table and field is optional; anything left out keeps its default.
//!
//! ```toml
//! [metric]
//! cover = 0.04
//! stirrup_lap = 0.12
//!
//! [metric.block]
//! length = 0.45
//! height = 0.225
//!
//! [imperial]
//! cover = 0.125
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_positive, BoqError, BoqResult};
use crate::units::UnitSystem;

/// Masonry unit face dimensions (length along the wall x course height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockSize {
    pub length: f64,
    pub height: f64,
}

impl BlockSize {
    pub fn face_area(&self) -> f64 {
        self.length * self.height
    }
}

/// Detailing constants for one unit system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetailingConfig {
    /// Concrete cover to stirrups and links
    pub cover: f64,

    /// Hook/lap allowance added to each closed stirrup
    pub stirrup_lap: f64,

    /// Lap allowance added to each strip-footing link
    pub link_lap: f64,

    /// Stirrup spacing used when a stirrup record omits one
    pub stirrup_spacing: f64,

    /// Longest single cut reported for a main bar
    pub max_cut_length: f64,

    /// CMU block face
    pub block: BlockSize,
}

impl DetailingConfig {
    /// Metric defaults (metres)
    pub fn metric() -> Self {
        DetailingConfig {
            cover: 0.025,
            stirrup_lap: 0.10,
            link_lap: 0.15,
            stirrup_spacing: 0.20,
            max_cut_length: 9.0,
            block: BlockSize {
                length: 0.4,
                height: 0.2,
            },
        }
    }

    /// Imperial defaults (feet)
    pub fn imperial() -> Self {
        DetailingConfig {
            cover: 0.083,
            stirrup_lap: 0.33,
            link_lap: 0.5,
            stirrup_spacing: 0.67,
            max_cut_length: 30.0,
            block: BlockSize {
                length: 1.33,
                height: 0.667,
            },
        }
    }

    /// Validate that every constant is usable as a length.
    pub fn validate(&self) -> BoqResult<()> {
        ensure_positive("cover", self.cover)?;
        ensure_positive("stirrup_lap", self.stirrup_lap)?;
        ensure_positive("link_lap", self.link_lap)?;
        ensure_positive("stirrup_spacing", self.stirrup_spacing)?;
        ensure_positive("max_cut_length", self.max_cut_length)?;
        ensure_positive("block.length", self.block.length)?;
        ensure_positive("block.height", self.block.height)?;
        Ok(())
    }

    fn apply(mut self, overrides: &DetailingOverrides) -> Self {
        if let Some(cover) = overrides.cover {
            self.cover = cover;
        }
        if let Some(lap) = overrides.stirrup_lap {
            self.stirrup_lap = lap;
        }
        if let Some(lap) = overrides.link_lap {
            self.link_lap = lap;
        }
        if let Some(spacing) = overrides.stirrup_spacing {
            self.stirrup_spacing = spacing;
        }
        if let Some(max) = overrides.max_cut_length {
            self.max_cut_length = max;
        }
        if let Some(block) = &overrides.block {
            if let Some(length) = block.length {
                self.block.length = length;
            }
            if let Some(height) = block.height {
                self.block.height = height;
            }
        }
        self
    }
}

impl Default for DetailingConfig {
    fn default() -> Self {
        DetailingConfig::metric()
    }
}

/// Detailing settings for both unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub metric: DetailingConfig,
    pub imperial: DetailingConfig,
}

impl Settings {
    /// Detailing constants matching an element's unit system
    pub fn detailing(&self, system: UnitSystem) -> &DetailingConfig {
        match system {
            UnitSystem::Metric => &self.metric,
            UnitSystem::Imperial => &self.imperial,
        }
    }

    /// Parse settings from TOML, filling gaps with defaults.
    pub fn from_toml_str(source: &str) -> BoqResult<Self> {
        let file: SettingsFile = toml::from_str(source)
            .map_err(|e| BoqError::configuration("settings", e.to_string()))?;

        let settings = Settings {
            metric: DetailingConfig::metric().apply(&file.metric),
            imperial: DetailingConfig::imperial().apply(&file.imperial),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate both unit-system tables.
    pub fn validate(&self) -> BoqResult<()> {
        self.metric.validate()?;
        self.imperial.validate()
    }

    /// Load settings from a TOML file on disk.
    pub fn load(path: &Path) -> BoqResult<Self> {
        let source = fs::read_to_string(path).map_err(|e| {
            BoqError::file_error("read settings", path.display().to_string(), e.to_string())
        })?;
        let settings = Settings::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded detailing settings");
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            metric: DetailingConfig::metric(),
            imperial: DetailingConfig::imperial(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    metric: DetailingOverrides,
    imperial: DetailingOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DetailingOverrides {
    cover: Option<f64>,
    stirrup_lap: Option<f64>,
    link_lap: Option<f64>,
    stirrup_spacing: Option<f64>,
    max_cut_length: Option<f64>,
    block: Option<BlockOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BlockOverrides {
    length: Option<f64>,
    height: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_defaults() {
        let cfg = DetailingConfig::metric();
        assert_eq!(cfg.cover, 0.025);
        assert_eq!(cfg.stirrup_lap, 0.10);
        assert_eq!(cfg.link_lap, 0.15);
        assert!((cfg.block.face_area() - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_detailing_follows_unit_system() {
        let settings = Settings::default();
        assert_eq!(settings.detailing(UnitSystem::Metric).cover, 0.025);
        assert_eq!(settings.detailing(UnitSystem::Imperial).block.length, 1.33);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [metric]
            cover = 0.04

            [metric.block]
            height = 0.225
            "#,
        )
        .unwrap();
        assert_eq!(settings.metric.cover, 0.04);
        assert_eq!(settings.metric.stirrup_lap, 0.10);
        assert_eq!(settings.metric.block.length, 0.4);
        assert_eq!(settings.metric.block.height, 0.225);
        assert_eq!(settings.imperial, DetailingConfig::imperial());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_imperial_stirrup_loop_uses_feet_constants() {
        use crate::rebar::{Stirrup, StirrupInput, StirrupSection};

        let input = StirrupInput {
            bar_type: "m10".to_string(),
            unit: None,
            spacing: Some(0.67),
            span: None,
            support_spacing: None,
        };
        let section = StirrupSection {
            width: 1.0,
            breadth: 1.5,
            run: 10.0,
        };
        let imperial = Settings::default();
        let stirrup = Stirrup::from_input(
            "stirrup",
            &input,
            UnitSystem::Imperial,
            section,
            imperial.detailing(UnitSystem::Imperial),
        )
        .unwrap();
        // 2(1.5 - 0.166) + 2(1.0 - 0.166) + 0.33, not the metric 0.025 / 0.10
        assert!((stirrup.length() - 4.666).abs() < 1e-9);
    }

    #[test]
    fn test_settings_validate_checks_both_tables() {
        assert!(Settings::default().validate().is_ok());

        let mut settings = Settings::default();
        settings.imperial.block.height = 0.0;
        match settings.validate().unwrap_err() {
            BoqError::Validation { field, .. } => assert_eq!(field, "block.height"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bad_settings_rejected() {
        let unknown = Settings::from_toml_str("[metric]\ncovr = 0.04\n").unwrap_err();
        assert_eq!(unknown.error_code(), "CONFIGURATION_ERROR");

        let negative = Settings::from_toml_str("[imperial]\ncover = -1.0\n").unwrap_err();
        assert_eq!(negative.error_code(), "VALIDATION_ERROR");
    }
}
