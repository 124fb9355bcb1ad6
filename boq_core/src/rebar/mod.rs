//! # Reinforcement Models
//!
//! Bar groups owned by structural elements. Every group reduces to a total
//! run of bar (cut length x number of pieces) which is converted into:
//!
//! - **rebars**: stock bars to order, `round(run / stock_length)`
//! - **weight**: `round(run * weight_per_unit_length, 3)`
//!
//! ## Bar Groups
//!
//! - [`mainbar`] - longitudinal bars with a caller-supplied count
//! - [`stirrup`] - closed loops around a rectangular section, counted from spacing
//! - [`links`] - transverse strip-footing bars, counted from spacing
//!
//! Slab over-support and temperature bars are main bars whose lengths and
//! counts are derived by the slab itself.

pub mod links;
pub mod mainbar;
pub mod stirrup;

use serde::{Deserialize, Serialize};

pub use links::{Links, LinksData, LinksInput};
pub use mainbar::{MainBar, MainBarData, MainBarInput};
pub use stirrup::{Stirrup, StirrupCount, StirrupData, StirrupInput, StirrupSection};

use crate::errors::{BoqError, BoqResult};
use crate::library::ReferenceLibrary;
use crate::units::{round_count, round_to, Quantity, UnitSystem};

/// Unit label for counts of mill stock bars
pub const STOCK_LENGTH_UNIT: &str = "length";

/// Number of stock bars, labelled with the bar type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarCount {
    #[serde(rename = "type")]
    pub label: String,
    pub value: u64,
    pub unit: String,
}

/// Stock bars and weight for one bar group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarTally {
    pub rebars: BarCount,
    pub weight: Quantity,
}

impl BarTally {
    /// Tally for `element_count` identical elements.
    pub fn scaled(&self, element_count: u32) -> BoqResult<BarTally> {
        let value = checked_count(
            "rebars",
            self.rebars.value.checked_mul(u64::from(element_count)),
        )?;
        Ok(BarTally {
            rebars: BarCount {
                value,
                ..self.rebars.clone()
            },
            weight: Quantity::new(
                round_to(self.weight.value * f64::from(element_count), 3),
                self.weight.unit.clone(),
            ),
        })
    }
}

/// Report entry for one bar group: tally plus the group's own fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroupReport<D> {
    pub rebars: BarCount,
    pub weight: Quantity,
    pub data: D,
}

impl<D> BarGroupReport<D> {
    pub fn new(tally: BarTally, data: D) -> Self {
        BarGroupReport {
            rebars: tally.rebars,
            weight: tally.weight,
            data,
        }
    }
}

/// Convert a total run of `designation` bar into stock bars and weight.
pub fn tally(
    lib: &dyn ReferenceLibrary,
    designation: &str,
    system: UnitSystem,
    run: f64,
) -> BoqResult<BarTally> {
    let spec = lib.rebar_spec(designation)?;
    let stock_length = spec.standard_length.get(system).value;
    let weight_per_unit = spec.weight_per_unit_length.get(system).value;

    Ok(BarTally {
        rebars: BarCount {
            label: spec.label(),
            value: round_count(run / stock_length),
            unit: STOCK_LENGTH_UNIT.to_string(),
        },
        weight: Quantity::new(round_to(run * weight_per_unit, 3), system.names().mass),
    })
}

/// Number of bars at `spacing` along `run`, rounded to the nearest bar.
pub fn count_by_spacing(field: &str, run: f64, spacing: f64) -> BoqResult<u64> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(BoqError::validation(
            field,
            spacing.to_string(),
            "Spacing must be positive",
        ));
    }
    Ok(round_count(run / spacing))
}

/// Unwrap a checked count, rejecting one that left the `u64` range.
pub(crate) fn checked_count(field: &str, count: Option<u64>) -> BoqResult<u64> {
    count.ok_or_else(|| {
        BoqError::validation(
            field,
            format!("> {}", u64::MAX),
            "Bar count exceeds representable range",
        )
    })
}

/// A bar group may restate its unit, but it must agree with its element.
///
/// An unrecognized token is a configuration error, like the element's own.
pub fn resolve_bar_unit(
    field: &str,
    element: UnitSystem,
    declared: Option<&str>,
) -> BoqResult<UnitSystem> {
    let Some(token) = declared else {
        return Ok(element);
    };
    let unit = UnitSystem::from_token(token).map_err(|e| match e {
        BoqError::Configuration { reason, .. } => {
            BoqError::configuration(format!("{}.unit", field), reason)
        }
        other => other,
    })?;
    if unit != element {
        return Err(BoqError::validation(
            format!("{}.unit", field),
            unit.token(),
            format!("Bar unit must match the element unit '{}'", element.token()),
        ));
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::TableLibrary;

    #[test]
    fn test_tally_metric() {
        let lib = TableLibrary::standard().unwrap();
        // 4.5 m x 4 bars of m16: 18 m run, 12 m stock, 1.58 kg/m
        let t = tally(lib, "m16", UnitSystem::Metric, 4.5 * 4.0).unwrap();
        assert_eq!(t.rebars.value, 2); // 1.5 rounds away from zero
        assert_eq!(t.rebars.label, "m16 ( 5/8inch )");
        assert_eq!(t.rebars.unit, "length");
        assert!((t.weight.value - 28.44).abs() < 1e-9);
        assert_eq!(t.weight.unit, "kg");
    }

    #[test]
    fn test_tally_imperial_uses_imperial_table() {
        let lib = TableLibrary::standard().unwrap();
        let t = tally(lib, "m16", UnitSystem::Imperial, 80.0).unwrap();
        assert_eq!(t.rebars.value, 2);
        assert!((t.weight.value - 83.44).abs() < 1e-9);
        assert_eq!(t.weight.unit, "lb");
    }

    #[test]
    fn test_tally_unknown_bar() {
        let lib = TableLibrary::standard().unwrap();
        let err = tally(lib, "x16", UnitSystem::Metric, 1.0).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_BAR_TYPE");
    }

    #[test]
    fn test_scaled() {
        let lib = TableLibrary::standard().unwrap();
        let t = tally(lib, "m16", UnitSystem::Metric, 27.2).unwrap();
        let five = t.scaled(5).unwrap();
        assert_eq!(five.rebars.value, t.rebars.value * 5);
        assert!((five.weight.value - round_to(t.weight.value * 5.0, 3)).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_overflow_is_validation_error() {
        let lib = TableLibrary::standard().unwrap();
        // run saturates the stock count at u64::MAX
        let t = tally(lib, "m16", UnitSystem::Metric, 1e30).unwrap();
        assert_eq!(t.rebars.value, u64::MAX);
        let err = t.scaled(2).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(t.scaled(1).unwrap().rebars.value, u64::MAX);
    }

    #[test]
    fn test_count_by_spacing_rejects_zero() {
        assert_eq!(count_by_spacing("spacing", 6.8, 0.25).unwrap(), 27);
        let err = count_by_spacing("spacing", 6.8, 0.0).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(count_by_spacing("spacing", 6.8, -0.2).is_err());
    }

    #[test]
    fn test_bar_unit_must_agree() {
        assert_eq!(
            resolve_bar_unit("main", UnitSystem::Metric, None).unwrap(),
            UnitSystem::Metric
        );
        assert!(resolve_bar_unit("main", UnitSystem::Metric, Some("metric")).is_ok());
        let err = resolve_bar_unit("main", UnitSystem::Metric, Some("ft")).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_bar_unit_token_must_resolve() {
        match resolve_bar_unit("stirrup", UnitSystem::Imperial, Some("cubits")).unwrap_err() {
            BoqError::Configuration { setting, .. } => assert_eq!(setting, "stirrup.unit"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
