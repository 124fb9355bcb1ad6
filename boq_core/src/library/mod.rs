//! # Reference Library
//!
//! Read-only lookups consumed by the quantity engine:
//!
//! - **Rebar specs**: nominal diameter, mill stock length and linear weight
//!   for each bar designation, in both unit systems.
//! - **Concrete mixes**: material factors per unit of dry volume for each
//!   concrete grade, plus the shared legend (wet volume factor, bag weight).
//!
//! The engine only depends on the [`ReferenceLibrary`] trait. The bundled
//! [`TableLibrary::standard`] tables are compiled into the crate from TOML and
//! parsed once on first use.
//!
//! ## Example
//!
//! ```rust
//! use boq_core::library::{ReferenceLibrary, TableLibrary};
//! use boq_core::units::UnitSystem;
//!
//! let lib = TableLibrary::standard().unwrap();
//! let m16 = lib.rebar_spec("m16").unwrap();
//! assert_eq!(m16.standard_length.get(UnitSystem::Metric).value, 12.0);
//! assert_eq!(m16.label(), "m16 ( 5/8inch )");
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{BoqError, BoqResult};
use crate::units::UnitSystem;

const REBAR_TABLE: &str = include_str!("data/rebars.toml");
const CONCRETE_TABLE: &str = include_str!("data/concrete.toml");

static STANDARD: Lazy<BoqResult<TableLibrary>> =
    Lazy::new(|| TableLibrary::from_toml_str(REBAR_TABLE, CONCRETE_TABLE));

/// Lookup service for bar and concrete-mix reference data.
pub trait ReferenceLibrary {
    /// Geometry and weight data for a bar designation (e.g. "m16").
    fn rebar_spec(&self, designation: &str) -> BoqResult<&RebarSpec>;

    /// Material proportions for a concrete grade (e.g. "m15").
    fn concrete_mix(&self, grade: &str) -> BoqResult<&MixSpec>;

    /// Wet volume factor and cement bag weight.
    fn mix_legend(&self) -> &MixLegend;
}

/// A value with its unit as stored in the reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableValue {
    pub value: f64,
    pub unit: String,
}

/// The same physical property expressed in both unit systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerSystem<T> {
    pub metric: T,
    pub imperial: T,
}

impl<T> PerSystem<T> {
    pub fn get(&self, system: UnitSystem) -> &T {
        match system {
            UnitSystem::Metric => &self.metric,
            UnitSystem::Imperial => &self.imperial,
        }
    }
}

/// Reference data for one reinforcing bar designation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarSpec {
    /// Designation the entry is filed under (filled from the table key)
    #[serde(default)]
    pub designation: String,

    /// Nominal diameter as an inch fraction (e.g. "5/8")
    pub nominal_diameter: String,

    /// Mill stock length
    pub standard_length: PerSystem<TableValue>,

    /// Weight per unit run
    pub weight_per_unit_length: PerSystem<TableValue>,
}

impl RebarSpec {
    /// Human-readable bar type label, e.g. `m16 ( 5/8inch )`
    pub fn label(&self) -> String {
        format!("{} ( {}inch )", self.designation, self.nominal_diameter)
    }
}

/// A mix factor stored as `[factor, unit]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixFactor(pub f64, pub String);

impl MixFactor {
    pub fn factor(&self) -> f64 {
        self.0
    }

    pub fn unit(&self) -> &str {
        &self.1
    }
}

/// Per-unit-volume material factors for a grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixMaterials {
    pub cement: PerSystem<MixFactor>,
    pub fine_agg: PerSystem<MixFactor>,
    pub coarse_agg: PerSystem<MixFactor>,
    pub water: PerSystem<MixFactor>,
}

/// Reference data for one concrete grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixSpec {
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub description: String,
    pub material: MixMaterials,
}

/// Shared concrete constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixLegend {
    /// Multiplier from dry volume to wet volume
    pub wet_volume_factor: f64,
    /// Weight of one cement bag
    pub bag_weight: PerSystem<MixFactor>,
}

#[derive(Debug, Deserialize)]
struct ConcreteTable {
    legend: MixLegend,
    grades: BTreeMap<String, MixSpec>,
}

/// [`ReferenceLibrary`] backed by in-memory tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLibrary {
    rebars: BTreeMap<String, RebarSpec>,
    mixes: BTreeMap<String, MixSpec>,
    legend: MixLegend,
}

impl TableLibrary {
    /// The bundled tables.
    pub fn standard() -> BoqResult<&'static TableLibrary> {
        Lazy::force(&STANDARD).as_ref().map_err(Clone::clone)
    }

    /// Build a library from rebar and concrete TOML sources.
    ///
    /// Keys are normalised to lower case so lookups are case-insensitive.
    pub fn from_toml_str(rebar_source: &str, concrete_source: &str) -> BoqResult<Self> {
        let raw_rebars: BTreeMap<String, RebarSpec> = toml::from_str(rebar_source)
            .map_err(|e| BoqError::configuration("rebar table", e.to_string()))?;
        let concrete: ConcreteTable = toml::from_str(concrete_source)
            .map_err(|e| BoqError::configuration("concrete table", e.to_string()))?;

        let rebars = raw_rebars
            .into_iter()
            .map(|(key, mut spec)| {
                spec.designation = key.clone();
                (key.to_lowercase(), spec)
            })
            .collect();

        let mixes = concrete
            .grades
            .into_iter()
            .map(|(key, mut mix)| {
                mix.grade = key.clone();
                (key.to_lowercase(), mix)
            })
            .collect();

        Ok(TableLibrary {
            rebars,
            mixes,
            legend: concrete.legend,
        })
    }

    /// Bar designations available, sorted
    pub fn bar_designations(&self) -> impl Iterator<Item = &str> {
        self.rebars.keys().map(String::as_str)
    }

    /// Concrete grades available, sorted
    pub fn concrete_grades(&self) -> impl Iterator<Item = &str> {
        self.mixes.keys().map(String::as_str)
    }
}

impl ReferenceLibrary for TableLibrary {
    fn rebar_spec(&self, designation: &str) -> BoqResult<&RebarSpec> {
        self.rebars
            .get(&designation.trim().to_lowercase())
            .ok_or_else(|| BoqError::unknown_bar_type(designation))
    }

    fn concrete_mix(&self, grade: &str) -> BoqResult<&MixSpec> {
        self.mixes
            .get(&grade.trim().to_lowercase())
            .ok_or_else(|| BoqError::unknown_concrete_grade(grade))
    }

    fn mix_legend(&self) -> &MixLegend {
        &self.legend
    }
}
