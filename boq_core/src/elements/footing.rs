//! # Footings
//!
//! Two foundation kinds share the same geometry and earthwork formulas:
//!
//! - [`RcFooting`]: pad (isolated) footings, repeated `amt` times, with main
//!   bars, optional extra bars and optional stirrups
//! - [`RcStripFooting`]: one continuous strip with main bars along its
//!   length and transverse links across its width
//!
//! ## Earthwork
//!
//! ```text
//! excavation = round(width * excavation_depth * length, 3)
//! backfill   = excavation - volume
//! ```
//!
//! The excavation must be at least as deep as the pour, so backfill is never
//! negative.

use serde::{Deserialize, Serialize};

use super::concrete::{concrete_report, ConcreteReport};
use super::Geometry;
use crate::errors::{ensure_count, ensure_positive, BoqError, BoqResult};
use crate::library::ReferenceLibrary;
use crate::rebar::{
    BarGroupReport, Links, LinksData, LinksInput, MainBar, MainBarData, MainBarInput, Stirrup,
    StirrupData, StirrupInput, StirrupSection,
};
use crate::settings::DetailingConfig;
use crate::units::{round_to, Quantity, UnitSystem};

fn default_footing_type() -> String {
    "isolated".to_string()
}

/// Pad footing input as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingInput {
    pub id: String,
    #[serde(default = "default_footing_type")]
    pub footing_type: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    pub excavation_depth: f64,
    pub amt: u32,
    pub ctype: String,
    pub rebars: FootingRebarsInput,
}

/// Bar groups of a pad footing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingRebarsInput {
    pub main: MainBarInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<MainBarInput>,
    #[serde(default, alias = "stirup", skip_serializing_if = "Option::is_none")]
    pub stirrup: Option<StirrupInput>,
}

/// Strip footing input as supplied by the caller.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "SF1", "unit": "m",
///   "width": 0.6, "depth": 0.25, "length": 10.0, "excavation_depth": 0.9,
///   "ctype": "m15",
///   "rebars": {
///     "main": { "type": "m12", "amt": 4 },
///     "links": { "type": "m10", "spacing": 0.2 }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripFootingInput {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    pub excavation_depth: f64,
    pub ctype: String,
    pub rebars: StripFootingRebarsInput,
}

/// Bar groups of a strip footing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripFootingRebarsInput {
    pub main: MainBarInput,
    pub links: LinksInput,
}

/// Validated dimensions common to both footing kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Footprint {
    width: f64,
    depth: f64,
    length: f64,
    excavation_depth: f64,
}

impl Footprint {
    fn new(width: f64, depth: f64, length: f64, excavation_depth: f64) -> BoqResult<Self> {
        ensure_positive("width", width)?;
        ensure_positive("depth", depth)?;
        ensure_positive("length", length)?;
        ensure_positive("excavation_depth", excavation_depth)?;
        if excavation_depth < depth {
            return Err(BoqError::validation(
                "excavation_depth",
                excavation_depth.to_string(),
                format!("Excavation must be at least the footing depth ({})", depth),
            ));
        }
        Ok(Footprint {
            width,
            depth,
            length,
            excavation_depth,
        })
    }

    fn volume(&self) -> f64 {
        round_to(self.width * self.depth * self.length, 3)
    }

    fn excavation(&self) -> f64 {
        round_to(self.width * self.excavation_depth * self.length, 3)
    }

    fn plan_area(&self) -> f64 {
        round_to(self.width * self.length, 2)
    }
}

/// Excavation and backfill volumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Earthwork {
    pub excavation: Quantity,
    pub backfill: Quantity,
}

impl Earthwork {
    fn new(footprint: &Footprint, amt: u32, unit: UnitSystem) -> Self {
        let n = f64::from(amt);
        let volume_unit = unit.names().volume;
        let excavation = footprint.excavation();
        let backfill = excavation - footprint.volume();
        Earthwork {
            excavation: Quantity::new(round_to(excavation * n, 3), volume_unit),
            backfill: Quantity::new(round_to(backfill * n, 3), volume_unit),
        }
    }
}

/// Validated pad footing geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footing {
    pub id: String,
    pub footing_type: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    pub excavation_depth: f64,
    pub amt: u32,
    pub ctype: String,
    #[serde(skip)]
    footprint: Footprint,
}

impl Footing {
    pub fn new(input: &FootingInput) -> BoqResult<Self> {
        let footprint = Footprint::new(input.width, input.depth, input.length, input.excavation_depth)?;
        ensure_count("amt", input.amt)?;
        Ok(Footing {
            id: input.id.clone(),
            footing_type: input.footing_type.clone(),
            unit: input.unit,
            width: input.width,
            depth: input.depth,
            length: input.length,
            excavation_depth: input.excavation_depth,
            amt: input.amt,
            ctype: input.ctype.clone(),
            footprint,
        })
    }

    /// Excavated volume of one footing
    pub fn excavation(&self) -> f64 {
        self.footprint.excavation()
    }

    /// Backfill around one footing
    pub fn backfill(&self) -> f64 {
        round_to(self.excavation() - self.volume(), 3)
    }
}

impl Geometry for Footing {
    fn volume(&self) -> f64 {
        self.footprint.volume()
    }

    fn surface_area(&self) -> f64 {
        self.footprint.plan_area()
    }
}

/// Pad footing bar groups in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootingRebars {
    pub main: BarGroupReport<MainBarData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<BarGroupReport<MainBarData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stirrups: Option<BarGroupReport<StirrupData>>,
}

/// Pad footing quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootingReport {
    pub foundation: Footing,
    pub rebars: FootingRebars,
    pub earthwork: Earthwork,
    pub concrete: ConcreteReport,
}

/// Pad footing with its resolved bar groups.
#[derive(Debug, Clone, PartialEq)]
pub struct RcFooting {
    footing: Footing,
    main: MainBar,
    extra: Option<MainBar>,
    stirrups: Option<Stirrup>,
    detailing: DetailingConfig,
}

impl RcFooting {
    pub fn new(input: &FootingInput, detailing: &DetailingConfig) -> BoqResult<Self> {
        let footing = Footing::new(input)?;
        let unit = footing.unit;

        let main = MainBar::from_input("main", &input.rebars.main, unit, Some(footing.length))?;
        let extra = input
            .rebars
            .extra
            .as_ref()
            .map(|extra| MainBar::from_input("extra", extra, unit, None))
            .transpose()?;
        let section = StirrupSection {
            width: footing.width,
            breadth: footing.depth,
            run: footing.length,
        };
        let stirrups = input
            .rebars
            .stirrup
            .as_ref()
            .map(|stirrup| Stirrup::from_input("stirrup", stirrup, unit, section, detailing))
            .transpose()?;

        Ok(RcFooting {
            footing,
            main,
            extra,
            stirrups,
            detailing: *detailing,
        })
    }

    pub fn footing(&self) -> &Footing {
        &self.footing
    }

    pub fn main_bars(&self) -> &MainBar {
        &self.main
    }

    pub fn stirrups(&self) -> Option<&Stirrup> {
        self.stirrups.as_ref()
    }

    pub fn earthwork(&self) -> Earthwork {
        Earthwork::new(&self.footing.footprint, self.footing.amt, self.footing.unit)
    }

    pub fn concrete(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ConcreteReport> {
        concrete_report(
            lib,
            &self.footing.ctype,
            self.footing.unit,
            self.footing.volume(),
            self.footing.amt,
        )
    }

    pub fn rebars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<FootingRebars> {
        let amt = self.footing.amt;
        Ok(FootingRebars {
            main: self.main.report(lib, &self.detailing, amt)?,
            extra: self
                .extra
                .as_ref()
                .map(|extra| extra.report(lib, &self.detailing, amt))
                .transpose()?,
            stirrups: self
                .stirrups
                .as_ref()
                .map(|stirrups| stirrups.report(lib, amt))
                .transpose()?,
        })
    }

    pub fn report(&self, lib: &dyn ReferenceLibrary) -> BoqResult<FootingReport> {
        Ok(FootingReport {
            foundation: self.footing.clone(),
            rebars: self.rebars(lib)?,
            earthwork: self.earthwork(),
            concrete: self.concrete(lib)?,
        })
    }
}

/// Validated strip footing geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripFooting {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    pub excavation_depth: f64,
    pub ctype: String,
    #[serde(skip)]
    footprint: Footprint,
}

impl StripFooting {
    pub fn new(input: &StripFootingInput) -> BoqResult<Self> {
        let footprint = Footprint::new(input.width, input.depth, input.length, input.excavation_depth)?;
        Ok(StripFooting {
            id: input.id.clone(),
            unit: input.unit,
            width: input.width,
            depth: input.depth,
            length: input.length,
            excavation_depth: input.excavation_depth,
            ctype: input.ctype.clone(),
            footprint,
        })
    }

    pub fn excavation(&self) -> f64 {
        self.footprint.excavation()
    }

    pub fn backfill(&self) -> f64 {
        round_to(self.excavation() - self.volume(), 3)
    }
}

impl Geometry for StripFooting {
    fn volume(&self) -> f64 {
        self.footprint.volume()
    }

    fn surface_area(&self) -> f64 {
        self.footprint.plan_area()
    }
}

/// Strip footing bar groups in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripFootingRebars {
    pub main: BarGroupReport<MainBarData>,
    pub links: BarGroupReport<LinksData>,
}

/// Strip footing quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripFootingReport {
    pub foundation: StripFooting,
    pub rebars: StripFootingRebars,
    pub earthwork: Earthwork,
    pub concrete: ConcreteReport,
}

/// Strip footing with its resolved bar groups.
#[derive(Debug, Clone, PartialEq)]
pub struct RcStripFooting {
    footing: StripFooting,
    main: MainBar,
    links: Links,
    detailing: DetailingConfig,
}

impl RcStripFooting {
    pub fn new(input: &StripFootingInput, detailing: &DetailingConfig) -> BoqResult<Self> {
        let footing = StripFooting::new(input)?;
        let main = MainBar::from_input("main", &input.rebars.main, footing.unit, Some(footing.length))?;
        let links = Links::from_input(
            "links",
            &input.rebars.links,
            footing.unit,
            footing.width,
            footing.length,
            detailing,
        )?;
        Ok(RcStripFooting {
            footing,
            main,
            links,
            detailing: *detailing,
        })
    }

    pub fn footing(&self) -> &StripFooting {
        &self.footing
    }

    pub fn main_bars(&self) -> &MainBar {
        &self.main
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn earthwork(&self) -> Earthwork {
        Earthwork::new(&self.footing.footprint, 1, self.footing.unit)
    }

    pub fn concrete(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ConcreteReport> {
        concrete_report(lib, &self.footing.ctype, self.footing.unit, self.footing.volume(), 1)
    }

    pub fn rebars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<StripFootingRebars> {
        Ok(StripFootingRebars {
            main: self.main.report(lib, &self.detailing, 1)?,
            links: self.links.report(lib)?,
        })
    }

    pub fn report(&self, lib: &dyn ReferenceLibrary) -> BoqResult<StripFootingReport> {
        Ok(StripFootingReport {
            foundation: self.footing.clone(),
            rebars: self.rebars(lib)?,
            earthwork: self.earthwork(),
            concrete: self.concrete(lib)?,
        })
    }
}
