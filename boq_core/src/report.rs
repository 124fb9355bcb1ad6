//! # Report Assembly
//!
//! The [`Estimator`] turns any [`ElementInput`] into its quantity report.
//! For each request it:
//!
//! 1. picks the detailing constants for the element's unit system (once)
//! 2. builds the element model, which validates geometry and resolves bar
//!    groups against that geometry
//! 3. evaluates the model against the reference library
//!
//! Nothing is cached between requests, so the same input always yields the
//! same report.
//!
//! ## Example
//!
//! ```rust
//! use boq_core::report::Estimator;
//!
//! let json = r#"{
//!     "type": "Floor", "id": "GF-1", "unit": "m",
//!     "width": 6.0, "length": 8.0, "depth": 0.1, "ctype": "m20"
//! }"#;
//!
//! let estimator = Estimator::standard().unwrap();
//! let report = estimator.report_json(json).unwrap();
//! assert_eq!(report["area"]["value"], 48.0);
//! ```

use serde::Serialize;

use crate::elements::{
    BeamReport, BlockWall, ColumnReport, ElementInput, ElementKind, FloorReport, FootingReport,
    RcBeam, RcColumn, RcFloor, RcFooting, RcSlab, RcStripFooting, SlabReport,
    StripFootingReport, WallReport,
};
use crate::errors::{BoqError, BoqResult};
use crate::library::{ReferenceLibrary, TableLibrary};
use crate::settings::Settings;
use crate::units::UnitSystem;

/// A finished report of any element kind.
///
/// Serializes as the bare report, keyed by the element's own top-level key
/// (`column`, `beam`, `foundation`, `slab`, `floor`, `wall`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ElementReport {
    Column(ColumnReport),
    Beam(BeamReport),
    Footing(FootingReport),
    StripFooting(StripFootingReport),
    SuspendedSlab(SlabReport),
    Floor(FloorReport),
    BlockWall(WallReport),
}

impl ElementReport {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementReport::Column(_) => ElementKind::Column,
            ElementReport::Beam(_) => ElementKind::Beam,
            ElementReport::Footing(_) => ElementKind::Footing,
            ElementReport::StripFooting(_) => ElementKind::StripFooting,
            ElementReport::SuspendedSlab(_) => ElementKind::SuspendedSlab,
            ElementReport::Floor(_) => ElementKind::Floor,
            ElementReport::BlockWall(_) => ElementKind::BlockWall,
        }
    }
}

/// Report builder bound to a reference library and detailing settings.
pub struct Estimator<'a> {
    library: &'a dyn ReferenceLibrary,
    settings: Settings,
}

impl<'a> Estimator<'a> {
    /// Bind a library and settings; both detailing tables are validated.
    pub fn new(library: &'a dyn ReferenceLibrary, settings: Settings) -> BoqResult<Self> {
        settings.validate()?;
        Ok(Estimator { library, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build the report for one element.
    pub fn report(&self, input: &ElementInput) -> BoqResult<ElementReport> {
        let unit = input.unit();
        let detailing = self.settings.detailing(unit);
        let lib = self.library;

        let report = match input {
            ElementInput::Column(c) => ElementReport::Column(RcColumn::new(c, detailing)?.report(lib)?),
            ElementInput::Beam(b) => ElementReport::Beam(RcBeam::new(b, detailing)?.report(lib)?),
            ElementInput::Footing(f) => {
                ElementReport::Footing(RcFooting::new(f, detailing)?.report(lib)?)
            }
            ElementInput::StripFooting(f) => {
                ElementReport::StripFooting(RcStripFooting::new(f, detailing)?.report(lib)?)
            }
            ElementInput::SuspendedSlab(s) => {
                ElementReport::SuspendedSlab(RcSlab::new(s, detailing)?.report(lib)?)
            }
            ElementInput::Floor(f) => ElementReport::Floor(RcFloor::new(f, detailing)?.report(lib)?),
            ElementInput::BlockWall(w) => ElementReport::BlockWall(BlockWall::new(w, detailing)?.report()),
        };

        tracing::debug!(
            kind = %input.kind(),
            element = input.label(),
            unit = %unit,
            "assembled element report"
        );
        Ok(report)
    }

    /// Parse a JSON element and build its report as a JSON value.
    pub fn report_json(&self, json: &str) -> BoqResult<serde_json::Value> {
        let input = parse_element(json)?;
        let report = self.report(&input)?;
        serde_json::to_value(&report).map_err(BoqError::serialization)
    }
}

impl Estimator<'static> {
    /// Estimator over the built-in tables with default detailing.
    pub fn standard() -> BoqResult<Self> {
        Estimator::new(TableLibrary::standard()?, Settings::default())
    }
}

/// Parse a tagged element from JSON.
///
/// An unrecognized `unit` token is reported as a configuration error rather
/// than a generic parse failure.
pub fn parse_element(json: &str) -> BoqResult<ElementInput> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(BoqError::serialization)?;
    match value.get("unit") {
        Some(serde_json::Value::String(token)) => {
            UnitSystem::from_token(token)?;
        }
        Some(_) => {
            return Err(BoqError::configuration("unit", "unit must be a string token"));
        }
        None => return Err(BoqError::missing_field("unit")),
    }
    serde_json::from_value(value).map_err(BoqError::serialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMN: &str = r#"{
        "type": "Column", "id": "C121", "unit": "m",
        "width": 0.402, "breadth": 0.45, "height": 6.8, "amt": 5, "ctype": "m15",
        "rebars": {
            "main": { "type": "m16", "unit": "m", "length": 4.5, "amt": 4 },
            "stirrup": { "type": "m10", "unit": "m", "spacing": 0.25, "span": 0.25, "support_spacing": 0.11 }
        }
    }"#;

    #[test]
    fn test_column_report_json() {
        let estimator = Estimator::standard().unwrap();
        let report = estimator.report_json(COLUMN).unwrap();
        assert_eq!(report["column"]["id"], "C121");
        assert_eq!(report["formwork"]["value"], 57.8);
        assert_eq!(report["rebars"]["stirrups"]["data"]["amount"], 45);
    }

    #[test]
    fn test_report_kind() {
        let estimator = Estimator::standard().unwrap();
        let input = parse_element(COLUMN).unwrap();
        let report = estimator.report(&input).unwrap();
        assert_eq!(report.kind(), ElementKind::Column);
    }

    #[test]
    fn test_unknown_unit_is_configuration_error() {
        let json = COLUMN.replace(r#""unit": "m","#, r#""unit": "cubits","#);
        let err = parse_element(&json).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_missing_unit() {
        let json = r#"{ "type": "Floor", "id": "F", "width": 1.0, "length": 1.0, "depth": 0.1, "ctype": "m20" }"#;
        assert_eq!(parse_element(json).unwrap_err(), BoqError::missing_field("unit"));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_element("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_custom_settings_flow_into_report() {
        let lib = TableLibrary::standard().unwrap();
        let mut settings = Settings::default();
        settings.metric.block.length = 0.45;
        settings.metric.block.height = 0.225;
        let estimator = Estimator::new(lib, settings).unwrap();
        let json = r#"{
            "type": "BlockWall", "tag": "W1", "unit": "m",
            "thickness": 0.15, "length": 4.05, "height": 2.25
        }"#;
        let report = estimator.report_json(json).unwrap();
        // 9.11 m2 over 0.10125 m2 blocks
        assert_eq!(report["blocks"]["value"], 90.0);
    }

    #[test]
    fn test_unusable_settings_rejected() {
        let lib = TableLibrary::standard().unwrap();

        let mut settings = Settings::default();
        settings.metric.block.length = 0.0;
        let err = Estimator::new(lib, settings).err().unwrap();
        assert_eq!(err, BoqError::validation("block.length", "0", "Must be a positive number"));

        let mut settings = Settings::default();
        settings.imperial.stirrup_spacing = 0.0;
        assert!(Estimator::new(lib, settings).is_err());
    }

    #[test]
    fn test_nested_unit_token_is_configuration_error() {
        let estimator = Estimator::standard().unwrap();
        let json = COLUMN.replace(
            r#""type": "m16", "unit": "m""#,
            r#""type": "m16", "unit": "cubits""#,
        );
        match estimator.report_json(&json).unwrap_err() {
            BoqError::Configuration { setting, .. } => assert_eq!(setting, "main.unit"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
