//! # Suspended Slab
//!
//! A single slab panel with a two-way bar mesh:
//!
//! - **main** bars run along the slab length, spaced across its width
//! - **distribution** bars run across the width, spaced along the length
//!
//! ## Over-Support Reinforcement
//!
//! When an `over_support` block is given, each direction gets two extra
//! groups derived once at construction. With `own` the bar's run and
//! `cross` the perpendicular dimension:
//!
//! ```text
//! support = own * span_ratio
//! mid     = own - 2 * support
//! over-support bars       : length support, count 2 * round(cross / over_support)
//! temperature / anti-crack: length mid,     count 2 * round(cross / mid_span)
//! ```
//!
//! The factor of two places bars at both edges of the panel.

use serde::{Deserialize, Serialize};

use super::concrete::{concrete_report, ConcreteReport};
use super::Geometry;
use crate::errors::{ensure_positive, BoqError, BoqResult};
use crate::library::ReferenceLibrary;
use crate::rebar::mainbar::prefix_field;
use crate::rebar::{
    checked_count, count_by_spacing, resolve_bar_unit, BarGroupReport, MainBar, MainBarData,
};
use crate::settings::DetailingConfig;
use crate::units::{round_to, Quantity, UnitSystem};

/// One direction of a slab mesh.
///
/// ```json
/// { "type": "m12", "spacing": 0.2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabBarInput {
    #[serde(rename = "type")]
    pub bar_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub spacing: f64,
}

/// Spacings for the two derived groups of one direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpacingInput {
    pub over_support: f64,
    pub mid_span: f64,
}

/// Over-support block of a slab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverSupportInput {
    /// Fraction of each bar's run anchored over one support
    pub span_ratio: f64,
    pub main: ZoneSpacingInput,
    pub distribution: ZoneSpacingInput,
}

/// Suspended slab input as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspendedSlabInput {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub length: f64,
    pub depth: f64,
    pub ctype: String,
    pub rebars: SlabRebarsInput,
}

/// Bar groups of a slab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabRebarsInput {
    pub main: SlabBarInput,
    pub distribution: SlabBarInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_support: Option<OverSupportInput>,
}

/// Raw fields of a spaced bar group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlabBarData {
    #[serde(flatten)]
    pub bar: MainBarData,
    pub spacing: f64,
}

/// A bar group laid at a fixed spacing. Count and length are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacedBars {
    bars: MainBar,
    spacing: f64,
}

impl SpacedBars {
    /// `count` bars of `bar_type`, each `length` long.
    fn with_count(
        field: &str,
        bar_type: &str,
        unit: UnitSystem,
        length: f64,
        count: u64,
        spacing: f64,
    ) -> BoqResult<Self> {
        let amt = u32::try_from(count).map_err(|_| {
            BoqError::validation(
                format!("{}.spacing", field),
                spacing.to_string(),
                "Spacing yields too many bars",
            )
        })?;
        if amt == 0 {
            return Err(BoqError::validation(
                format!("{}.spacing", field),
                spacing.to_string(),
                "Spacing is wider than the slab; no bars would be placed",
            ));
        }
        let bars = MainBar::new(bar_type, unit, length, amt).map_err(|e| prefix_field(field, e))?;
        Ok(SpacedBars { bars, spacing })
    }

    /// Bars spanning `own`, spaced across `cross`.
    pub(crate) fn across(
        field: &str,
        input: &SlabBarInput,
        element_unit: UnitSystem,
        own: f64,
        cross: f64,
    ) -> BoqResult<Self> {
        let unit = resolve_bar_unit(field, element_unit, input.unit.as_deref())?;
        let count = count_by_spacing("spacing", cross, input.spacing)
            .map_err(|e| prefix_field(field, e))?;
        SpacedBars::with_count(field, &input.bar_type, unit, own, count, input.spacing)
    }

    pub fn bars(&self) -> &MainBar {
        &self.bars
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn report(
        &self,
        lib: &dyn ReferenceLibrary,
        detailing: &DetailingConfig,
    ) -> BoqResult<BarGroupReport<SlabBarData>> {
        let group = self.bars.report(lib, detailing, 1)?;
        Ok(BarGroupReport {
            rebars: group.rebars,
            weight: group.weight,
            data: SlabBarData {
                bar: group.data,
                spacing: self.spacing,
            },
        })
    }
}

/// The two derived groups of one mesh direction.
#[derive(Debug, Clone, PartialEq)]
struct SupportBars {
    over_support: SpacedBars,
    mid_span: SpacedBars,
}

impl SupportBars {
    fn derive(
        field: &str,
        mid_field: &str,
        direction: &SpacedBars,
        own: f64,
        cross: f64,
        span_ratio: f64,
        spacing: &ZoneSpacingInput,
    ) -> BoqResult<Self> {
        let support = own * span_ratio;
        let mid = own - support * 2.0;
        let bars = direction.bars();

        // One run of bars at each edge of the panel.
        let over_count = count_by_spacing("spacing", cross, spacing.over_support)
            .and_then(|n| checked_count("spacing", n.checked_mul(2)))
            .map_err(|e| prefix_field(field, e))?;
        let mid_count = count_by_spacing("spacing", cross, spacing.mid_span)
            .and_then(|n| checked_count("spacing", n.checked_mul(2)))
            .map_err(|e| prefix_field(mid_field, e))?;

        tracing::trace!(group = field, support, mid, over_count, mid_count, "derived slab support bars");

        Ok(SupportBars {
            over_support: SpacedBars::with_count(
                field,
                bars.bar_type(),
                bars.unit(),
                support,
                over_count,
                spacing.over_support,
            )?,
            mid_span: SpacedBars::with_count(
                mid_field,
                bars.bar_type(),
                bars.unit(),
                mid,
                mid_count,
                spacing.mid_span,
            )?,
        })
    }
}

/// Validated slab geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspendedSlab {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub length: f64,
    pub depth: f64,
    pub ctype: String,
}

impl SuspendedSlab {
    pub fn new(input: &SuspendedSlabInput) -> BoqResult<Self> {
        ensure_positive("width", input.width)?;
        ensure_positive("length", input.length)?;
        ensure_positive("depth", input.depth)?;
        Ok(SuspendedSlab {
            id: input.id.clone(),
            unit: input.unit,
            width: input.width,
            length: input.length,
            depth: input.depth,
            ctype: input.ctype.clone(),
        })
    }
}

impl Geometry for SuspendedSlab {
    fn volume(&self) -> f64 {
        round_to(self.width * self.length * self.depth, 3)
    }

    fn surface_area(&self) -> f64 {
        round_to(self.width * self.length, 2)
    }
}

/// Slab bar groups in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlabRebars {
    pub main: BarGroupReport<SlabBarData>,
    pub distribution: BarGroupReport<SlabBarData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_over_support: Option<BarGroupReport<SlabBarData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_temperature: Option<BarGroupReport<SlabBarData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_over_support: Option<BarGroupReport<SlabBarData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_anti_crack: Option<BarGroupReport<SlabBarData>>,
}

/// Slab quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlabReport {
    pub slab: SuspendedSlab,
    pub rebars: SlabRebars,
    pub formwork: Quantity,
    pub concrete: ConcreteReport,
}

/// Slab with its mesh and derived support bars.
#[derive(Debug, Clone, PartialEq)]
pub struct RcSlab {
    slab: SuspendedSlab,
    main: SpacedBars,
    distribution: SpacedBars,
    main_support: Option<SupportBars>,
    distribution_support: Option<SupportBars>,
    detailing: DetailingConfig,
}

impl RcSlab {
    pub fn new(input: &SuspendedSlabInput, detailing: &DetailingConfig) -> BoqResult<Self> {
        let slab = SuspendedSlab::new(input)?;
        let (width, length) = (slab.width, slab.length);

        let main = SpacedBars::across("main", &input.rebars.main, slab.unit, length, width)?;
        let distribution =
            SpacedBars::across("distribution", &input.rebars.distribution, slab.unit, width, length)?;

        let (main_support, distribution_support) = match &input.rebars.over_support {
            Some(over) => {
                ensure_positive("over_support.span_ratio", over.span_ratio)?;
                if over.span_ratio >= 0.5 {
                    return Err(BoqError::validation(
                        "over_support.span_ratio",
                        over.span_ratio.to_string(),
                        "Support zones at both ends leave no mid span (span_ratio < 0.5)",
                    ));
                }
                let main_support = SupportBars::derive(
                    "main_over_support",
                    "main_temperature",
                    &main,
                    length,
                    width,
                    over.span_ratio,
                    &over.main,
                )?;
                let distribution_support = SupportBars::derive(
                    "distribution_over_support",
                    "distribution_anti_crack",
                    &distribution,
                    width,
                    length,
                    over.span_ratio,
                    &over.distribution,
                )?;
                (Some(main_support), Some(distribution_support))
            }
            None => (None, None),
        };

        Ok(RcSlab {
            slab,
            main,
            distribution,
            main_support,
            distribution_support,
            detailing: *detailing,
        })
    }

    pub fn slab(&self) -> &SuspendedSlab {
        &self.slab
    }

    pub fn main_bars(&self) -> &SpacedBars {
        &self.main
    }

    pub fn distribution_bars(&self) -> &SpacedBars {
        &self.distribution
    }

    pub fn main_over_support(&self) -> Option<&SpacedBars> {
        self.main_support.as_ref().map(|s| &s.over_support)
    }

    pub fn main_temperature(&self) -> Option<&SpacedBars> {
        self.main_support.as_ref().map(|s| &s.mid_span)
    }

    pub fn distribution_over_support(&self) -> Option<&SpacedBars> {
        self.distribution_support.as_ref().map(|s| &s.over_support)
    }

    pub fn distribution_anti_crack(&self) -> Option<&SpacedBars> {
        self.distribution_support.as_ref().map(|s| &s.mid_span)
    }

    pub fn formwork(&self) -> Quantity {
        Quantity::new(self.slab.surface_area(), self.slab.unit.names().area)
    }

    pub fn concrete(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ConcreteReport> {
        concrete_report(lib, &self.slab.ctype, self.slab.unit, self.slab.volume(), 1)
    }

    pub fn rebars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<SlabRebars> {
        let detailing = &self.detailing;
        let optional = |group: Option<&SpacedBars>| {
            group.map(|bars| bars.report(lib, detailing)).transpose()
        };
        Ok(SlabRebars {
            main: self.main.report(lib, detailing)?,
            distribution: self.distribution.report(lib, detailing)?,
            main_over_support: optional(self.main_over_support())?,
            main_temperature: optional(self.main_temperature())?,
            distribution_over_support: optional(self.distribution_over_support())?,
            distribution_anti_crack: optional(self.distribution_anti_crack())?,
        })
    }

    pub fn report(&self, lib: &dyn ReferenceLibrary) -> BoqResult<SlabReport> {
        Ok(SlabReport {
            slab: self.slab.clone(),
            rebars: self.rebars(lib)?,
            formwork: self.formwork(),
            concrete: self.concrete(lib)?,
        })
    }
}
