//! Stirrups: closed loops around a rectangular section.
//!
//! ## Loop Length
//!
//! ```text
//! 2(breadth - 2c) + 2(width - 2c) + lap
//! ```
//!
//! ## Count Along the Run
//!
//! With both `span` and `support_spacing` given, a zone of `run * span` at
//! each end is tied at the tighter support spacing and the remainder at the
//! main spacing. Otherwise the whole run uses the main spacing.

use serde::{Deserialize, Serialize};

use super::mainbar::prefix_field;
use super::{checked_count, resolve_bar_unit, tally, BarGroupReport, BarTally};
use crate::errors::{ensure_positive, BoqError, BoqResult};
use crate::library::ReferenceLibrary;
use crate::settings::DetailingConfig;
use crate::units::{round_count, round_to, UnitSystem};

/// Stirrup record as supplied by the caller.
///
/// ## JSON Example
///
/// ```json
/// { "type": "m10", "spacing": 0.25, "span": 0.25, "support_spacing": 0.11 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupInput {
    #[serde(rename = "type")]
    pub bar_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Main (mid-zone) spacing; falls back to the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,

    /// Fraction of the run treated as a support zone at each end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<f64>,

    /// Spacing inside the support zones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_spacing: Option<f64>,
}

/// Section the stirrups wrap and the run they are distributed along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StirrupSection {
    pub width: f64,
    pub breadth: f64,
    pub run: f64,
}

/// Stirrup counts for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StirrupCount {
    pub main: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<u64>,
    pub total: u64,
}

/// Raw fields echoed in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StirrupData {
    #[serde(rename = "type")]
    pub bar_type: String,
    pub unit: UnitSystem,
    pub spacing: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_spacing: Option<f64>,
    pub cut_length: f64,
    pub amount: u64,
}

/// A resolved stirrup group. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Stirrup {
    bar_type: String,
    unit: UnitSystem,
    spacing: f64,
    support_zone: Option<SupportZone>,
    section: StirrupSection,
    cover: f64,
    lap: f64,
    count: StirrupCount,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SupportZone {
    span: f64,
    spacing: f64,
}

impl Stirrup {
    pub fn from_input(
        field: &str,
        input: &StirrupInput,
        element_unit: UnitSystem,
        section: StirrupSection,
        detailing: &DetailingConfig,
    ) -> BoqResult<Self> {
        let unit = resolve_bar_unit(field, element_unit, input.unit.as_deref())?;
        Stirrup::build(input, unit, section, detailing).map_err(|e| prefix_field(field, e))
    }

    fn build(
        input: &StirrupInput,
        unit: UnitSystem,
        section: StirrupSection,
        detailing: &DetailingConfig,
    ) -> BoqResult<Self> {
        let spacing = input.spacing.unwrap_or(detailing.stirrup_spacing);
        ensure_positive("spacing", spacing)?;

        let support_zone = match (input.span, input.support_spacing) {
            (Some(span), Some(support_spacing)) => {
                ensure_positive("span", span)?;
                ensure_positive("support_spacing", support_spacing)?;
                if span > 0.5 {
                    return Err(BoqError::validation(
                        "span",
                        span.to_string(),
                        "Support zones at both ends cannot exceed the run (span <= 0.5)",
                    ));
                }
                Some(SupportZone {
                    span,
                    spacing: support_spacing,
                })
            }
            _ => None,
        };

        let stirrup = Stirrup {
            bar_type: input.bar_type.clone(),
            unit,
            spacing,
            support_zone,
            section,
            cover: detailing.cover,
            lap: detailing.stirrup_lap,
            count: count_along(section.run, spacing, support_zone)?,
        };
        if stirrup.length() <= stirrup.lap {
            return Err(BoqError::validation(
                "cover",
                detailing.cover.to_string(),
                "Cover leaves no room for a stirrup inside the section",
            ));
        }
        Ok(stirrup)
    }

    pub fn bar_type(&self) -> &str {
        &self.bar_type
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Length of one closed loop including the lap
    pub fn length(&self) -> f64 {
        let s = &self.section;
        (s.breadth - self.cover * 2.0) * 2.0 + (s.width - self.cover * 2.0) * 2.0 + self.lap
    }

    /// Length of one support zone (0 without support detailing)
    pub fn over_support(&self) -> f64 {
        self.support_zone
            .map(|zone| self.section.run * zone.span)
            .unwrap_or(0.0)
    }

    /// Number of stirrups along the run.
    pub fn count(&self) -> StirrupCount {
        self.count
    }

    /// Stock bars and weight for one element
    pub fn bars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<BarTally> {
        let run = self.length() * self.count().total as f64;
        tally(lib, &self.bar_type, self.unit, run)
    }

    /// Report entry for `element_count` identical elements.
    pub fn report(
        &self,
        lib: &dyn ReferenceLibrary,
        element_count: u32,
    ) -> BoqResult<BarGroupReport<StirrupData>> {
        let tally = self.bars(lib)?.scaled(element_count)?;
        Ok(BarGroupReport::new(
            tally,
            StirrupData {
                bar_type: self.bar_type.clone(),
                unit: self.unit,
                spacing: self.spacing,
                span: self.support_zone.map(|z| z.span),
                support_spacing: self.support_zone.map(|z| z.spacing),
                cut_length: round_to(self.length(), 2),
                amount: self.count().total,
            },
        ))
    }
}

/// Spacings must already be validated positive.
fn count_along(run: f64, spacing: f64, zone: Option<SupportZone>) -> BoqResult<StirrupCount> {
    match zone {
        Some(zone) => {
            let support_length = run * zone.span * 2.0;
            let support = round_count(support_length / zone.spacing);
            let main = round_count((run - support_length) / spacing);
            Ok(StirrupCount {
                main,
                support: Some(support),
                total: checked_count("amount", main.checked_add(support))?,
            })
        }
        None => {
            let main = round_count(run / spacing);
            Ok(StirrupCount {
                main,
                support: None,
                total: main,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::TableLibrary;

    fn column_section() -> StirrupSection {
        StirrupSection {
            width: 0.402,
            breadth: 0.45,
            run: 6.8,
        }
    }

    fn seismic() -> StirrupInput {
        StirrupInput {
            bar_type: "m10".to_string(),
            unit: None,
            spacing: Some(0.25),
            span: Some(0.25),
            support_spacing: Some(0.11),
        }
    }

    fn build(input: &StirrupInput) -> BoqResult<Stirrup> {
        Stirrup::from_input(
            "stirrup",
            input,
            UnitSystem::Metric,
            column_section(),
            &DetailingConfig::metric(),
        )
    }

    #[test]
    fn test_loop_length() {
        let s = build(&seismic()).unwrap();
        // 2(0.45 - 0.05) + 2(0.402 - 0.05) + 0.1
        assert!((s.length() - 1.604).abs() < 1e-9);
    }

    #[test]
    fn test_support_zone_count() {
        let s = build(&seismic()).unwrap();
        // support zone 6.8 * 0.25 = 1.7 each end, 3.4 total
        assert!((s.over_support() - 1.7).abs() < 1e-9);
        let c = s.count();
        assert_eq!(c.support, Some(31)); // 3.4 / 0.11 = 30.9
        assert_eq!(c.main, 14); // 3.4 / 0.25 = 13.6
        assert_eq!(c.total, c.main + c.support.unwrap());
    }

    #[test]
    fn test_uniform_count_without_support_spacing() {
        let mut input = seismic();
        input.support_spacing = None;
        let s = build(&input).unwrap();
        let c = s.count();
        assert_eq!(c.support, None);
        assert_eq!(c.main, 27); // 6.8 / 0.25 = 27.2
        assert_eq!(c.total, c.main);
        assert_eq!(s.over_support(), 0.0);
    }

    #[test]
    fn test_default_spacing_from_settings() {
        let mut input = seismic();
        input.spacing = None;
        input.span = None;
        let s = build(&input).unwrap();
        assert_eq!(s.spacing(), 0.2);
        assert_eq!(s.count().total, 34);
    }

    #[test]
    fn test_zero_spacing_is_validation_error() {
        let mut input = seismic();
        input.support_spacing = Some(0.0);
        match build(&input).unwrap_err() {
            BoqError::Validation { field, .. } => assert_eq!(field, "stirrup.support_spacing"),
            other => panic!("unexpected error {other:?}"),
        }

        let mut input = seismic();
        input.spacing = Some(0.0);
        assert_eq!(build(&input).unwrap_err().error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_count_overflow_is_validation_error() {
        let section = StirrupSection {
            run: 1e19,
            ..column_section()
        };
        let detailing = DetailingConfig::metric();
        let err = Stirrup::from_input("stirrup", &seismic(), UnitSystem::Metric, section, &detailing)
            .unwrap_err();
        match err {
            BoqError::Validation { field, reason, .. } => {
                assert_eq!(field, "stirrup.amount");
                assert!(reason.contains("representable"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_span_beyond_half_rejected() {
        let mut input = seismic();
        input.span = Some(0.6);
        assert!(build(&input).is_err());
    }

    #[test]
    fn test_report_omits_support_fields_without_both() {
        let lib = TableLibrary::standard().unwrap();
        let mut input = seismic();
        input.span = None;
        let s = build(&input).unwrap();
        let json = serde_json::to_value(s.report(lib, 1).unwrap()).unwrap();
        let data = json["data"].as_object().unwrap();
        assert!(!data.contains_key("span"));
        assert!(!data.contains_key("support_spacing"));
        assert_eq!(data["amount"], 27);
        assert_eq!(data["cut_length"], 1.6);
    }

    #[test]
    fn test_report_keeps_support_fields_with_both() {
        let lib = TableLibrary::standard().unwrap();
        let s = build(&seismic()).unwrap();
        let json = serde_json::to_value(s.report(lib, 5).unwrap()).unwrap();
        assert_eq!(json["data"]["span"], 0.25);
        assert_eq!(json["data"]["support_spacing"], 0.11);
        assert_eq!(json["weight"]["unit"], "kg");
    }

    #[test]
    fn test_bars_use_loop_run() {
        let lib = TableLibrary::standard().unwrap();
        let s = build(&seismic()).unwrap();
        let t = s.bars(lib).unwrap();
        let run = s.length() * 45.0;
        assert_eq!(t.rebars.value, (run / 12.0).round() as u64);
        assert!((t.weight.value - round_to(run * 0.617, 3)).abs() < 1e-9);
    }
}
