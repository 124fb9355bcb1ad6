//! Main (longitudinal) bars.
//!
//! A main bar group is `amt` pieces of one designation, each `length` long.
//! Elements inject the length from their own geometry where the caller does
//! not give one (column height, beam length, footing length).

use serde::{Deserialize, Serialize};

use super::{resolve_bar_unit, tally, BarGroupReport, BarTally};
use crate::errors::{ensure_count, ensure_positive, BoqError, BoqResult};
use crate::library::ReferenceLibrary;
use crate::settings::DetailingConfig;
use crate::units::{Quantity, UnitSystem};

/// Main bar group as supplied by the caller.
///
/// ## JSON Example
///
/// ```json
/// { "type": "m16", "unit": "m", "length": 4.5, "amt": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainBarInput {
    /// Bar designation (e.g. "m16")
    #[serde(rename = "type")]
    pub bar_type: String,

    /// Optional restatement of the element unit (`m` or `ft`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Length of each piece; elements supply a default from their geometry.
    /// Columns always use their own height and ignore this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Number of pieces per element
    pub amt: u32,
}

/// A resolved main bar group. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MainBar {
    bar_type: String,
    unit: UnitSystem,
    length: f64,
    amt: u32,
}

/// Raw fields echoed in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainBarData {
    #[serde(rename = "type")]
    pub bar_type: String,
    pub unit: UnitSystem,
    pub length: f64,
    pub amt: u32,
    pub cut_length: Quantity,
}

impl MainBar {
    pub fn new(bar_type: impl Into<String>, unit: UnitSystem, length: f64, amt: u32) -> BoqResult<Self> {
        ensure_positive("length", length)?;
        ensure_count("amt", amt)?;
        Ok(MainBar {
            bar_type: bar_type.into(),
            unit,
            length,
            amt,
        })
    }

    /// Resolve a caller record against its element.
    ///
    /// `default_length` is used when the record carries no length; without
    /// either the record is rejected.
    pub fn from_input(
        field: &str,
        input: &MainBarInput,
        element_unit: UnitSystem,
        default_length: Option<f64>,
    ) -> BoqResult<Self> {
        let unit = resolve_bar_unit(field, element_unit, input.unit.as_deref())?;
        let length = input
            .length
            .or(default_length)
            .ok_or_else(|| BoqError::missing_field(format!("{}.length", field)))?;
        MainBar::new(&input.bar_type, unit, length, input.amt)
            .map_err(|e| prefix_field(field, e))
    }

    pub fn bar_type(&self) -> &str {
        &self.bar_type
    }

    pub fn unit(&self) -> UnitSystem {
        self.unit
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn amt(&self) -> u32 {
        self.amt
    }

    /// Total bar run for one element
    pub fn run_length(&self) -> f64 {
        self.length * f64::from(self.amt)
    }

    /// Length of a single cut, capped at the longest practical stock cut.
    pub fn cut_length(&self, detailing: &DetailingConfig) -> Quantity {
        let unit = self.unit.names().length;
        if self.length < detailing.max_cut_length {
            Quantity::new(self.length, unit)
        } else {
            tracing::warn!(
                bar = %self.bar_type,
                length = self.length,
                cap = detailing.max_cut_length,
                "main bar longer than the maximum cut; reporting capped cut length"
            );
            Quantity::new(detailing.max_cut_length, unit)
        }
    }

    /// Stock bars and weight for one element
    pub fn bars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<BarTally> {
        tally(lib, &self.bar_type, self.unit, self.run_length())
    }

    /// Report entry for `element_count` identical elements.
    pub fn report(
        &self,
        lib: &dyn ReferenceLibrary,
        detailing: &DetailingConfig,
        element_count: u32,
    ) -> BoqResult<BarGroupReport<MainBarData>> {
        let tally = self.bars(lib)?.scaled(element_count)?;
        Ok(BarGroupReport::new(
            tally,
            MainBarData {
                bar_type: self.bar_type.clone(),
                unit: self.unit,
                length: self.length,
                amt: self.amt,
                cut_length: self.cut_length(detailing),
            },
        ))
    }
}

/// Qualify a field name in a validation error with its bar group.
pub(crate) fn prefix_field(group: &str, err: BoqError) -> BoqError {
    match err {
        BoqError::Validation { field, value, reason } => BoqError::Validation {
            field: format!("{}.{}", group, field),
            value,
            reason,
        },
        other => other,
    }
}
