//! Links: transverse bars across a strip footing.
//!
//! Each link spans the footing width inside the cover plus a lap allowance;
//! links are spaced along the footing length.

use serde::{Deserialize, Serialize};

use super::mainbar::prefix_field;
use super::{count_by_spacing, resolve_bar_unit, tally, BarGroupReport, BarTally};
use crate::errors::{BoqError, BoqResult};
use crate::library::ReferenceLibrary;
use crate::settings::DetailingConfig;
use crate::units::{round_to, UnitSystem};

/// Link record as supplied by the caller.
///
/// ## JSON Example
///
/// ```json
/// { "type": "m12", "spacing": 0.2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinksInput {
    #[serde(rename = "type")]
    pub bar_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    pub spacing: f64,
}

/// Raw fields echoed in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinksData {
    #[serde(rename = "type")]
    pub bar_type: String,
    pub unit: UnitSystem,
    pub spacing: f64,
    pub cut_length: f64,
    pub amount: u64,
}

/// A resolved link group. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Links {
    bar_type: String,
    unit: UnitSystem,
    spacing: f64,
    footing_width: f64,
    cover: f64,
    lap: f64,
    amount: u64,
}

impl Links {
    pub fn from_input(
        field: &str,
        input: &LinksInput,
        element_unit: UnitSystem,
        footing_width: f64,
        footing_length: f64,
        detailing: &DetailingConfig,
    ) -> BoqResult<Self> {
        let unit = resolve_bar_unit(field, element_unit, input.unit.as_deref())?;
        let amount = count_by_spacing("spacing", footing_length, input.spacing)
            .map_err(|e| prefix_field(field, e))?;

        let links = Links {
            bar_type: input.bar_type.clone(),
            unit,
            spacing: input.spacing,
            footing_width,
            cover: detailing.cover,
            lap: detailing.link_lap,
            amount,
        };
        if footing_width - detailing.cover * 2.0 <= 0.0 {
            return Err(BoqError::validation(
                format!("{}.cover", field),
                detailing.cover.to_string(),
                "Cover leaves no room for a link across the footing",
            ));
        }
        Ok(links)
    }

    /// Length of one link including the lap
    pub fn length(&self) -> f64 {
        (self.footing_width - self.cover * 2.0) + self.lap
    }

    /// Number of links along the footing
    pub fn count(&self) -> u64 {
        self.amount
    }

    pub fn bars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<BarTally> {
        tally(lib, &self.bar_type, self.unit, self.length() * self.amount as f64)
    }

    pub fn report(&self, lib: &dyn ReferenceLibrary) -> BoqResult<BarGroupReport<LinksData>> {
        Ok(BarGroupReport::new(
            self.bars(lib)?,
            LinksData {
                bar_type: self.bar_type.clone(),
                unit: self.unit,
                spacing: self.spacing,
                cut_length: round_to(self.length(), 2),
                amount: self.amount,
            },
        ))
    }
}
