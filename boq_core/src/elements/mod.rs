//! # Structural Elements
//!
//! Each element kind follows the same pattern:
//!
//! - `*Input` - caller data, JSON-serializable, including its bar groups
//! - a geometry record (`Column`, `Beam`, ...) - validated dimensions and the
//!   pure formulas over them (volume, girth, areas)
//! - an assembled model (`RcColumn`, `RcBeam`, ...) - geometry plus resolved
//!   bar groups, built once and read-only afterwards
//! - `*Report` - the nested `{value, unit}` output
//!
//! ## Available Elements
//!
//! - [`column`] - reinforced concrete columns
//! - [`beam`] - suspended and ground beams
//! - [`footing`] - pad footings and strip footings
//! - [`slab`] - suspended slabs with over-support reinforcement
//! - [`floor`] - ground floor slabs
//! - [`wall`] - block walls with window and door openings

pub mod beam;
pub mod column;
pub mod concrete;
pub mod floor;
pub mod footing;
pub mod slab;
pub mod wall;

use serde::{Deserialize, Serialize};

pub use beam::{Beam, BeamInput, BeamReport, BeamType, RcBeam};
pub use column::{Column, ColumnInput, ColumnReport, RcColumn};
pub use concrete::{concrete_report, ConcreteReport};
pub use floor::{Floor, FloorInput, FloorReport, RcFloor};
pub use footing::{
    Footing, FootingInput, FootingReport, RcFooting, RcStripFooting, StripFooting, StripFootingInput,
    StripFootingReport,
};
pub use slab::{RcSlab, SlabBarInput, SlabReport, SuspendedSlab, SuspendedSlabInput};
pub use wall::{BlockWall, BlockWallInput, Opening, OpeningKind, WallReport};

use crate::units::UnitSystem;

/// Capabilities every element geometry provides.
pub trait Geometry {
    /// Solid volume of one element
    fn volume(&self) -> f64;

    /// Principal surface of one element (formwork contact, plan or wall face)
    fn surface_area(&self) -> f64;
}

/// Element kinds, with the key their report is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Column,
    Beam,
    Footing,
    StripFooting,
    SuspendedSlab,
    Floor,
    BlockWall,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Column,
        ElementKind::Beam,
        ElementKind::Footing,
        ElementKind::StripFooting,
        ElementKind::SuspendedSlab,
        ElementKind::Floor,
        ElementKind::BlockWall,
    ];

    /// Top-level key of this kind's report
    pub fn report_key(&self) -> &'static str {
        match self {
            ElementKind::Column => "column",
            ElementKind::Beam => "beam",
            ElementKind::Footing | ElementKind::StripFooting => "foundation",
            ElementKind::SuspendedSlab => "slab",
            ElementKind::Floor => "floor",
            ElementKind::BlockWall => "wall",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Column => "Column",
            ElementKind::Beam => "Beam",
            ElementKind::Footing => "Footing",
            ElementKind::StripFooting => "Strip Footing",
            ElementKind::SuspendedSlab => "Suspended Slab",
            ElementKind::Floor => "Floor",
            ElementKind::BlockWall => "Block Wall",
        }
    }

    /// Whether reinforcement and concrete are scaled by an element count
    pub fn repeats(&self) -> bool {
        matches!(self, ElementKind::Column | ElementKind::Beam | ElementKind::Footing)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Any element input, tagged by kind.
///
/// ## JSON Example
///
/// ```json
/// {
///   "type": "Column",
///   "id": "C1",
///   "unit": "m",
///   "width": 0.402, "breadth": 0.45, "height": 6.8,
///   "amt": 5, "ctype": "m15",
///   "rebars": {
///     "main": { "type": "m16", "amt": 4 },
///     "stirrup": { "type": "m10", "spacing": 0.25 }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementInput {
    Column(ColumnInput),
    Beam(BeamInput),
    Footing(FootingInput),
    StripFooting(StripFootingInput),
    SuspendedSlab(SuspendedSlabInput),
    Floor(FloorInput),
    BlockWall(BlockWallInput),
}

impl ElementInput {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementInput::Column(_) => ElementKind::Column,
            ElementInput::Beam(_) => ElementKind::Beam,
            ElementInput::Footing(_) => ElementKind::Footing,
            ElementInput::StripFooting(_) => ElementKind::StripFooting,
            ElementInput::SuspendedSlab(_) => ElementKind::SuspendedSlab,
            ElementInput::Floor(_) => ElementKind::Floor,
            ElementInput::BlockWall(_) => ElementKind::BlockWall,
        }
    }

    /// The caller's identifier for this element
    pub fn label(&self) -> &str {
        match self {
            ElementInput::Column(c) => &c.id,
            ElementInput::Beam(b) => &b.id,
            ElementInput::Footing(f) => &f.id,
            ElementInput::StripFooting(f) => &f.id,
            ElementInput::SuspendedSlab(s) => &s.id,
            ElementInput::Floor(f) => &f.id,
            ElementInput::BlockWall(w) => &w.tag,
        }
    }

    /// Declared unit system
    pub fn unit(&self) -> UnitSystem {
        match self {
            ElementInput::Column(c) => c.unit,
            ElementInput::Beam(b) => b.unit,
            ElementInput::Footing(f) => f.unit,
            ElementInput::StripFooting(f) => f.unit,
            ElementInput::SuspendedSlab(s) => s.unit,
            ElementInput::Floor(f) => f.unit,
            ElementInput::BlockWall(w) => w.unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_keys() {
        assert_eq!(ElementKind::Column.report_key(), "column");
        assert_eq!(ElementKind::Footing.report_key(), "foundation");
        assert_eq!(ElementKind::StripFooting.report_key(), "foundation");
        assert_eq!(ElementKind::SuspendedSlab.report_key(), "slab");
        assert_eq!(ElementKind::BlockWall.report_key(), "wall");
    }

    #[test]
    fn test_repeating_kinds() {
        let repeating: Vec<_> = ElementKind::ALL.iter().filter(|k| k.repeats()).collect();
        assert_eq!(
            repeating,
            vec![&ElementKind::Column, &ElementKind::Beam, &ElementKind::Footing]
        );
    }

    #[test]
    fn test_tagged_input_parses() {
        let json = r#"{
            "type": "Floor",
            "id": "GF-1",
            "unit": "m",
            "width": 6.0,
            "length": 8.0,
            "depth": 0.1,
            "ctype": "m20"
        }"#;
        let input: ElementInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.kind(), ElementKind::Floor);
        assert_eq!(input.label(), "GF-1");
        assert_eq!(input.unit(), UnitSystem::Metric);
    }
}
