//! Ground floor slab: a single pour on grade with an optional bar mesh.

use serde::{Deserialize, Serialize};

use super::concrete::{concrete_report, ConcreteReport};
use super::slab::{SlabBarData, SlabBarInput, SpacedBars};
use super::Geometry;
use crate::errors::{ensure_positive, BoqResult};
use crate::library::ReferenceLibrary;
use crate::rebar::BarGroupReport;
use crate::settings::DetailingConfig;
use crate::units::{round_to, Quantity, UnitSystem};

/// Floor input as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorInput {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub length: f64,
    pub depth: f64,
    pub ctype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebars: Option<FloorRebarsInput>,
}

/// Mesh of a floor slab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorRebarsInput {
    pub main: SlabBarInput,
    pub distribution: SlabBarInput,
}

/// Validated floor geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Floor {
    pub id: String,
    pub unit: UnitSystem,
    pub width: f64,
    pub length: f64,
    pub depth: f64,
    pub ctype: String,
}

impl Floor {
    pub fn new(input: &FloorInput) -> BoqResult<Self> {
        ensure_positive("width", input.width)?;
        ensure_positive("length", input.length)?;
        ensure_positive("depth", input.depth)?;
        Ok(Floor {
            id: input.id.clone(),
            unit: input.unit,
            width: input.width,
            length: input.length,
            depth: input.depth,
            ctype: input.ctype.clone(),
        })
    }
}

impl Geometry for Floor {
    fn volume(&self) -> f64 {
        round_to(self.width * self.length * self.depth, 3)
    }

    fn surface_area(&self) -> f64 {
        round_to(self.width * self.length, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorRebars {
    pub main: BarGroupReport<SlabBarData>,
    pub distribution: BarGroupReport<SlabBarData>,
}

/// Floor quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorReport {
    pub floor: Floor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebars: Option<FloorRebars>,
    pub area: Quantity,
    pub concrete: ConcreteReport,
}

#[derive(Debug, Clone, PartialEq)]
struct Mesh {
    main: SpacedBars,
    distribution: SpacedBars,
}

/// Floor with its optional mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct RcFloor {
    floor: Floor,
    mesh: Option<Mesh>,
    detailing: DetailingConfig,
}

impl RcFloor {
    pub fn new(input: &FloorInput, detailing: &DetailingConfig) -> BoqResult<Self> {
        let floor = Floor::new(input)?;
        let mesh = match &input.rebars {
            Some(rebars) => Some(Mesh {
                main: SpacedBars::across("main", &rebars.main, floor.unit, floor.length, floor.width)?,
                distribution: SpacedBars::across(
                    "distribution",
                    &rebars.distribution,
                    floor.unit,
                    floor.width,
                    floor.length,
                )?,
            }),
            None => None,
        };
        Ok(RcFloor {
            floor,
            mesh,
            detailing: *detailing,
        })
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    pub fn main_bars(&self) -> Option<&SpacedBars> {
        self.mesh.as_ref().map(|m| &m.main)
    }

    pub fn area(&self) -> Quantity {
        Quantity::new(self.floor.surface_area(), self.floor.unit.names().area)
    }

    pub fn concrete(&self, lib: &dyn ReferenceLibrary) -> BoqResult<ConcreteReport> {
        concrete_report(lib, &self.floor.ctype, self.floor.unit, self.floor.volume(), 1)
    }

    pub fn rebars(&self, lib: &dyn ReferenceLibrary) -> BoqResult<Option<FloorRebars>> {
        self.mesh
            .as_ref()
            .map(|mesh| {
                Ok(FloorRebars {
                    main: mesh.main.report(lib, &self.detailing)?,
                    distribution: mesh.distribution.report(lib, &self.detailing)?,
                })
            })
            .transpose()
    }

    pub fn report(&self, lib: &dyn ReferenceLibrary) -> BoqResult<FloorReport> {
        Ok(FloorReport {
            floor: self.floor.clone(),
            rebars: self.rebars(lib)?,
            area: self.area(),
            concrete: self.concrete(lib)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::TableLibrary;

    fn plain_input() -> FloorInput {
        FloorInput {
            id: "GF-1".to_string(),
            unit: UnitSystem::Metric,
            width: 6.0,
            length: 8.0,
            depth: 0.1,
            ctype: "m20".to_string(),
            rebars: None,
        }
    }

    #[test]
    fn test_plain_floor() {
        let lib = TableLibrary::standard().unwrap();
        let floor = RcFloor::new(&plain_input(), &DetailingConfig::metric()).unwrap();
        assert_eq!(floor.floor().volume(), 4.8);
        assert_eq!(floor.area().value, 48.0);
        let json = serde_json::to_value(floor.report(lib).unwrap()).unwrap();
        assert!(json.get("rebars").is_none());
        assert_eq!(json["area"]["unit"], "m2");
        assert_eq!(json["concrete"]["cement"]["bag"]["value"], 39.0);
    }

    #[test]
    fn test_meshed_floor() {
        let lib = TableLibrary::standard().unwrap();
        let mut input = plain_input();
        input.rebars = Some(FloorRebarsInput {
            main: SlabBarInput {
                bar_type: "m10".to_string(),
                unit: None,
                spacing: 0.3,
            },
            distribution: SlabBarInput {
                bar_type: "m10".to_string(),
                unit: None,
                spacing: 0.3,
            },
        });
        let floor = RcFloor::new(&input, &DetailingConfig::metric()).unwrap();
        assert_eq!(floor.main_bars().unwrap().bars().amt(), 20);
        let rebars = floor.rebars(lib).unwrap().unwrap();
        // 27 bars x 6 m across the length
        assert_eq!(rebars.distribution.data.bar.amt, 27);
        assert_eq!(rebars.distribution.rebars.value, 14);
    }

    #[test]
    fn test_imperial_floor_units() {
        let mut input = plain_input();
        input.unit = UnitSystem::Imperial;
        input.width = 20.0;
        input.length = 30.0;
        input.depth = 0.33;
        let floor = RcFloor::new(&input, &DetailingConfig::imperial()).unwrap();
        assert_eq!(floor.area().unit, "ft2");
        assert_eq!(floor.area().value, 600.0);
    }
}
