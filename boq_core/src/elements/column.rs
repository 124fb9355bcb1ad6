//! # Reinforced Concrete Column
//!
//! Quantities for `amt` identical rectangular columns.
//!
//! ## Formulas
//!
//! ```text
//! volume   = round(width * breadth * height, 3)
//! girth    = round(2 * (width + breadth), 2)
//! surface  = girth * height
//! formwork = round(surface * amt, 2)
//! ```
//!
//! Main bars always run the full column height; stirrups wrap the
//! `width x breadth` section and are spaced up the height.
//!
//! ## Example
//!
//! ```rust
//! use boq_core::elements::column::{ColumnInput, ColumnRebarsInput, RcColumn};
//! use boq_core::library::TableLibrary;
//! use boq_core::rebar::{MainBarInput, StirrupInput};
//! use boq_core::settings::DetailingConfig;
//! use boq_core::units::UnitSystem;
//!
//! let input = ColumnInput {
//!     id: "C121".to_string(),
//!     unit: UnitSystem::Metric,
//!     width: 0.402,
//!     breadth: 0.45,
//!     height: 6.8,
//!     amt: 5,
//!     ctype: "m15".to_string(),
//!     rebars: ColumnRebarsInput {
//!         main: MainBarInput { bar_type: "m16".into(), unit: None, length: None, amt: 4 },
//!         stirrup: StirrupInput {
//!             bar_type: "m10".into(),
//!             unit: None,
//!             spacing: Some(0.25),
//!             span: Some(0.25),
//!             support_spacing: Some(0.11),
//!         },
//!     },
//! };
//!
//! let column = RcColumn::new(&input, &DetailingConfig::metric()).unwrap();
//! let report = column.report(TableLibrary::standard().unwrap()).unwrap();
//! assert_eq!(report.formwork.value, 57.8);
//! ```

use serde::{Deserialize, Serialize};

use super::concrete::{concrete_report, ConcreteReport};
use super::Geometry;
use crate::errors::{ensure_count, ensure_positive, BoqResult};
use crate::library::ReferenceLibrary;
use crate::rebar::{
    BarGroupReport, MainBar, MainBarData, MainBarInput, Stirrup, StirrupData, StirrupInput,
    StirrupSection,
};
use crate::settings::DetailingConfig;
use crate::units::{round_to, Quantity, UnitSystem};

/// Column input as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInput {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    #[serde(alias = "bredth")]
    pub breadth: f64,
    pub height: f64,
    pub amt: u32,
    /// Concrete grade (e.g. "m15")
    pub ctype: String,
    pub rebars: ColumnRebarsInput,
}

/// Bar groups of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRebarsInput {
    pub main: MainBarInput,
    #[serde(alias = "stirup")]
    pub stirrup: StirrupInput,
}

/// Validated column geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub breadth: f64,
    pub height: f64,
    pub amt: u32,
    pub ctype: String,
}

impl Column {
    pub fn new(input: &ColumnInput) -> BoqResult<Self> {
        ensure_positive("width", input.width)?;
        ensure_positive("breadth", input.breadth)?;
        ensure_positive("height", input.height)?;
        ensure_count("amt", input.amt)?;
        Ok(Column {
            id: input.id.clone(),
            unit: input.unit,
            width: input.width,
            breadth: input.breadth,
            height: input.height,
            amt: input.amt,
            ctype: input.ctype.clone(),
        })
    }

    /// Cross-section perimeter
    pub fn girth(&self) -> f64 {
        round_to(self.width * 2.0 + self.breadth * 2.0, 2)
    }
}

impl Geometry for Column {
    fn volume(&self) -> f64 {
        round_to(self.width * self.breadth * self.height, 3)
    }

    fn surface_area(&self) -> f64 {
        self.girth() * self.height
    }
}

/// Column bar groups in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRebars {
    pub main: BarGroupReport<MainBarData>,
    pub stirrups: BarGroupReport<StirrupData>,
}

/// Column quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    pub column: Column,
    pub rebars: ColumnRebars,
    pub formwork: Quantity,
    pub concrete: ConcreteReport,
}

/// Column with its resolved bar groups.
#[derive(Debug, Clone, PartialEq)]
pub struct RcColumn {
    column: Column,
    main: MainBar,
    stirrups: Stirrup,
    detailing: DetailingConfig,
}

impl RcColumn {
    pub fn new(input: &ColumnInput, detailing: &DetailingConfig) -> BoqResult<Self> {
        let column = Column::new(input)?;

        let main_input = MainBarInput {
            length: Some(column.height),
            ..input.rebars.main.clone()
        };
        let main = MainBar::from_input("main", &main_input, column.unit, None)?;

        let section = StirrupSection {
            width: column.width,
            breadth: column.breadth,
            run: column.height,
        };
        let stirrups =
            Stirrup::from_input("stirrup", &input.rebars.stirrup, column.unit, section, detailing)?;

        Ok(RcColumn {
            column,
            main,
            stirrups,
            detailing: *detailing,
        })
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn main_bars(&self) -> &MainBar {
        &self.main
    }

    pub fn stirrups(&self) -> &Stirrup {
        &self.stirrups
    }

    pub fn formwork(&self) -> Quantity {
        Quantity::new(
            round_to(self.column.surface_area() * f64::from(self.column.amt), 2),
            self.column.unit.names().area,
        )
    }

    pub fn concrete(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ConcreteReport> {
        concrete_report(
            lib,
            &self.column.ctype,
            self.column.unit,
            self.column.volume(),
            self.column.amt,
        )
    }

    pub fn rebars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ColumnRebars> {
        Ok(ColumnRebars {
            main: self.main.report(lib, &self.detailing, self.column.amt)?,
            stirrups: self.stirrups.report(lib, self.column.amt)?,
        })
    }

    pub fn report(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ColumnReport> {
        Ok(ColumnReport {
            column: self.column.clone(),
            rebars: self.rebars(lib)?,
            formwork: self.formwork(),
            concrete: self.concrete(lib)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BoqError;
    use crate::library::TableLibrary;

    fn test_input() -> ColumnInput {
        ColumnInput {
            id: "C121".to_string(),
            unit: UnitSystem::Metric,
            width: 0.402,
            breadth: 0.45,
            height: 6.8,
            amt: 5,
            ctype: "m15".to_string(),
            rebars: ColumnRebarsInput {
                main: MainBarInput {
                    bar_type: "m16".to_string(),
                    unit: Some("m".to_string()),
                    length: Some(4.5),
                    amt: 4,
                },
                stirrup: StirrupInput {
                    bar_type: "m10".to_string(),
                    unit: Some("m".to_string()),
                    spacing: Some(0.25),
                    span: Some(0.25),
                    support_spacing: Some(0.11),
                },
            },
        }
    }

    fn test_column() -> RcColumn {
        RcColumn::new(&test_input(), &DetailingConfig::metric()).unwrap()
    }

    #[test]
    fn test_geometry() {
        let c = test_column();
        assert_eq!(c.column().volume(), 1.23);
        assert_eq!(c.column().girth(), 1.70);
        assert!((c.column().surface_area() - 1.70 * 6.8).abs() < 1e-12);
    }

    #[test]
    fn test_formwork() {
        let c = test_column();
        assert_eq!(c.formwork().value, 57.8);
        assert_eq!(c.formwork().unit, "m2");
    }

    #[test]
    fn test_main_bars_run_column_height() {
        let c = test_column();
        assert_eq!(c.main_bars().length(), 6.8);
        assert_eq!(c.main_bars().amt(), 4);
    }

    #[test]
    fn test_rebars_scaled_by_column_count() {
        let lib = TableLibrary::standard().unwrap();
        let c = test_column();
        let one = c.main_bars().bars(lib).unwrap();
        let rebars = c.rebars(lib).unwrap();
        // 6.8 x 4 = 27.2 m -> 2 stock bars per column
        assert_eq!(one.rebars.value, 2);
        assert_eq!(rebars.main.rebars.value, 10);
        assert!((rebars.main.weight.value - round_to(42.976 * 5.0, 3)).abs() < 1e-9);
        assert_eq!(rebars.stirrups.data.amount, 45);
        let stirrup_one = c.stirrups().bars(lib).unwrap();
        assert_eq!(rebars.stirrups.rebars.value, stirrup_one.rebars.value * 5);
    }

    #[test]
    fn test_concrete() {
        let lib = TableLibrary::standard().unwrap();
        let concrete = test_column().concrete(lib).unwrap();
        assert!((concrete.dry_volume.value - 6.15).abs() < 1e-9);
        assert_eq!(concrete.grade, "m15");
    }

    #[test]
    fn test_report_shape() {
        let lib = TableLibrary::standard().unwrap();
        let json = serde_json::to_value(test_column().report(lib).unwrap()).unwrap();
        assert_eq!(json["column"]["id"], "C121");
        assert_eq!(json["column"]["unit"], "m");
        assert!(json["column"].get("rebars").is_none());
        assert_eq!(json["rebars"]["main"]["rebars"]["type"], "m16 ( 5/8inch )");
        assert_eq!(json["rebars"]["stirrups"]["data"]["cut_length"], 1.6);
        assert!(json["rebars"]["stirrups"]["data"].get("clm_width").is_none());
        assert_eq!(json["formwork"]["unit"], "m2");
        assert_eq!(json["concrete"]["cement"]["bag"]["unit"], "bag");
    }

    #[test]
    fn test_legacy_spelling_accepted() {
        let json = r#"{
            "id": "C1", "unit": "m", "width": 0.3, "bredth": 0.3, "height": 3.0,
            "amt": 1, "ctype": "m20",
            "rebars": {
                "main": { "type": "m12", "amt": 4 },
                "stirup": { "type": "m8", "spacing": 0.2 }
            }
        }"#;
        let input: ColumnInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.breadth, 0.3);
        assert!(RcColumn::new(&input, &DetailingConfig::metric()).is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut input = test_input();
        input.height = 0.0;
        let err = RcColumn::new(&input, &DetailingConfig::metric()).unwrap_err();
        assert!(matches!(err, BoqError::Validation { ref field, .. } if field == "height"));

        let mut input = test_input();
        input.amt = 0;
        assert!(RcColumn::new(&input, &DetailingConfig::metric()).is_err());
    }

    #[test]
    fn test_bar_unit_mismatch() {
        let mut input = test_input();
        input.rebars.stirrup.unit = Some("ft".to_string());
        let err = RcColumn::new(&input, &DetailingConfig::metric()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_report_is_idempotent() {
        let lib = TableLibrary::standard().unwrap();
        let c = test_column();
        assert_eq!(c.report(lib).unwrap(), c.report(lib).unwrap());
    }
}
