//! # Reinforced Concrete Beam
//!
//! Quantities for `amt` identical rectangular beams.
//!
//! ## Formwork Girth
//!
//! - **Suspended**: soffit plus both sides, `width + 2 * depth`
//! - **Ground**: sides only (the soffit bears on blinding), `2 * depth`
//!
//! Main bars default to the beam length; extra bars (top bars, bent-ups)
//! must state their own length. Stirrups wrap the `width x depth` section
//! and are spaced along the beam length.

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

/// Support condition that decides which faces need formwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamType {
    #[default]
    Suspended,
    Ground,
}

/// Beam input as supplied by the caller.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "B1", "beam_type": "suspended", "unit": "m",
///   "width": 0.23, "depth": 0.45, "length": 5.4, "amt": 3, "ctype": "m20",
///   "rebars": {
///     "main": { "type": "m16", "amt": 4 },
///     "extra": { "type": "m12", "length": 1.8, "amt": 2 },
///     "stirrup": { "type": "m10", "spacing": 0.2 }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamInput {
    pub id: String,
    #[serde(default)]
    pub beam_type: BeamType,
    pub unit: UnitSystem,
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    pub amt: u32,
    pub ctype: String,
    pub rebars: BeamRebarsInput,
}

/// Bar groups of a beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamRebarsInput {
    pub main: MainBarInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<MainBarInput>,
    #[serde(alias = "stirup")]
    pub stirrup: StirrupInput,
}

/// Validated beam geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Beam {
    pub id: String,
    pub beam_type: BeamType,
    pub unit: UnitSystem,
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    pub amt: u32,
    pub ctype: String,
}

impl Beam {
    pub fn new(input: &BeamInput) -> BoqResult<Self> {
        ensure_positive("width", input.width)?;
        ensure_positive("depth", input.depth)?;
        ensure_positive("length", input.length)?;
        ensure_count("amt", input.amt)?;
        Ok(Beam {
            id: input.id.clone(),
            beam_type: input.beam_type,
            unit: input.unit,
            width: input.width,
            depth: input.depth,
            length: input.length,
            amt: input.amt,
            ctype: input.ctype.clone(),
        })
    }

    /// Formed perimeter of the section
    pub fn girth(&self) -> f64 {
        match self.beam_type {
            BeamType::Suspended => round_to(self.width + self.depth * 2.0, 2),
            BeamType::Ground => round_to(self.depth * 2.0, 2),
        }
    }
}

impl Geometry for Beam {
    fn volume(&self) -> f64 {
        round_to(self.width * self.depth * self.length, 3)
    }

    fn surface_area(&self) -> f64 {
        round_to(self.girth() * self.length, 2)
    }
}

/// Beam bar groups in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeamRebars {
    pub main: BarGroupReport<MainBarData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<BarGroupReport<MainBarData>>,
    pub stirrups: BarGroupReport<StirrupData>,
}

/// Beam quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeamReport {
    pub beam: Beam,
    pub rebars: BeamRebars,
    pub formwork: Quantity,
    pub concrete: ConcreteReport,
}

/// Beam with its resolved bar groups.
#[derive(Debug, Clone, PartialEq)]
pub struct RcBeam {
    beam: Beam,
    main: MainBar,
    extra: Option<MainBar>,
    stirrups: Stirrup,
    detailing: DetailingConfig,
}

impl RcBeam {
    pub fn new(input: &BeamInput, detailing: &DetailingConfig) -> BoqResult<Self> {
        let beam = Beam::new(input)?;

        let main = MainBar::from_input("main", &input.rebars.main, beam.unit, Some(beam.length))?;
        let extra = input
            .rebars
            .extra
            .as_ref()
            .map(|extra| MainBar::from_input("extra", extra, beam.unit, None))
            .transpose()?;

        let section = StirrupSection {
            width: beam.width,
            breadth: beam.depth,
            run: beam.length,
        };
        let stirrups =
            Stirrup::from_input("stirrup", &input.rebars.stirrup, beam.unit, section, detailing)?;

        Ok(RcBeam {
            beam,
            main,
            extra,
            stirrups,
            detailing: *detailing,
        })
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    pub fn main_bars(&self) -> &MainBar {
        &self.main
    }

    pub fn extra_bars(&self) -> Option<&MainBar> {
        self.extra.as_ref()
    }

    pub fn stirrups(&self) -> &Stirrup {
        &self.stirrups
    }

    pub fn formwork(&self) -> Quantity {
        Quantity::new(
            round_to(self.beam.surface_area() * f64::from(self.beam.amt), 2),
            self.beam.unit.names().area,
        )
    }

    pub fn concrete(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ConcreteReport> {
        concrete_report(lib, &self.beam.ctype, self.beam.unit, self.beam.volume(), self.beam.amt)
    }

    pub fn rebars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<BeamRebars> {
        let amt = self.beam.amt;
        Ok(BeamRebars {
            main: self.main.report(lib, &self.detailing, amt)?,
            extra: self
                .extra
                .as_ref()
                .map(|extra| extra.report(lib, &self.detailing, amt))
                .transpose()?,
            stirrups: self.stirrups.report(lib, amt)?,
        })
    }

    pub fn report(&self, lib: &dyn ReferenceLibrary) -> BoqResult<BeamReport> {
        Ok(BeamReport {
            beam: self.beam.clone(),
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

    fn test_input() -> BeamInput {
        BeamInput {
            id: "B1".to_string(),
            beam_type: BeamType::Suspended,
            unit: UnitSystem::Metric,
            width: 0.23,
            depth: 0.45,
            length: 5.4,
            amt: 3,
            ctype: "m20".to_string(),
            rebars: BeamRebarsInput {
                main: MainBarInput {
                    bar_type: "m16".to_string(),
                    unit: None,
                    length: None,
                    amt: 4,
                },
                extra: Some(MainBarInput {
                    bar_type: "m12".to_string(),
                    unit: None,
                    length: Some(1.8),
                    amt: 2,
                }),
                stirrup: StirrupInput {
                    bar_type: "m10".to_string(),
                    unit: None,
                    spacing: Some(0.2),
                    span: None,
                    support_spacing: None,
                },
            },
        }
    }

    #[test]
    fn test_suspended_girth() {
        let beam = Beam::new(&test_input()).unwrap();
        // 0.23 + 2 * 0.45
        assert_eq!(beam.girth(), 1.13);
        assert_eq!(beam.surface_area(), round_to(1.13 * 5.4, 2));
    }

    #[test]
    fn test_ground_girth() {
        let mut input = test_input();
        input.beam_type = BeamType::Ground;
        let beam = Beam::new(&input).unwrap();
        assert_eq!(beam.girth(), 0.9);
    }

    #[test]
    fn test_volume() {
        let beam = Beam::new(&test_input()).unwrap();
        // 0.23 * 0.45 * 5.4 = 0.5589
        assert_eq!(beam.volume(), 0.559);
    }

    #[test]
    fn test_main_bars_default_to_beam_length() {
        let rc = RcBeam::new(&test_input(), &DetailingConfig::metric()).unwrap();
        assert_eq!(rc.main_bars().length(), 5.4);
        assert_eq!(rc.extra_bars().unwrap().length(), 1.8);
    }

    #[test]
    fn test_extra_without_length_rejected() {
        let mut input = test_input();
        if let Some(extra) = input.rebars.extra.as_mut() {
            extra.length = None;
        }
        let err = RcBeam::new(&input, &DetailingConfig::metric()).unwrap_err();
        assert_eq!(err, BoqError::missing_field("extra.length"));
    }

    #[test]
    fn test_formwork_scaled() {
        let rc = RcBeam::new(&test_input(), &DetailingConfig::metric()).unwrap();
        assert_eq!(rc.formwork().value, round_to(6.1 * 3.0, 2));
    }

    #[test]
    fn test_stirrups_along_length() {
        let rc = RcBeam::new(&test_input(), &DetailingConfig::metric()).unwrap();
        // 5.4 / 0.2 = 27
        assert_eq!(rc.stirrups().count().total, 27);
        // 2(0.45 - 0.05) + 2(0.23 - 0.05) + 0.1
        assert!((rc.stirrups().length() - 1.26).abs() < 1e-9);
    }

    #[test]
    fn test_report_without_extra() {
        let lib = TableLibrary::standard().unwrap();
        let mut input = test_input();
        input.rebars.extra = None;
        let rc = RcBeam::new(&input, &DetailingConfig::metric()).unwrap();
        let json = serde_json::to_value(rc.report(lib).unwrap()).unwrap();
        assert!(json["rebars"].get("extra").is_none());
        assert_eq!(json["beam"]["beam_type"], "suspended");
    }

    #[test]
    fn test_report_scales_extra() {
        let lib = TableLibrary::standard().unwrap();
        let rc = RcBeam::new(&test_input(), &DetailingConfig::metric()).unwrap();
        let rebars = rc.rebars(lib).unwrap();
        let extra = rebars.extra.unwrap();
        // 1.8 x 2 = 3.6 m of m12 per beam, 0.888 kg/m
        assert!((extra.weight.value - round_to(3.197 * 3.0, 3)).abs() < 1e-9);
    }
}
