//! # Block Wall
//!
//! Masonry takeoff for one wall face with window and door openings.
//!
//! ```text
//! gross  = length * height
//! net    = gross - sum(opening.width * opening.height * opening.amt)
//! render = net * 2                        (both faces)
//! blocks = ceil(net / block face area)
//! jamb   = window: 2w + 2h   door: w + 2h   (per opening, times amt)
//! ```
//!
//! A door has no sill, so its jamb lining covers one width only.

use serde::{Deserialize, Serialize};

use super::Geometry;
use crate::errors::{ensure_count, ensure_positive, BoqError, BoqResult};
use crate::settings::{BlockSize, DetailingConfig};
use crate::units::{round_to, Quantity, UnitSystem};

/// Unit label for block counts
pub const BLOCK_UNIT: &str = "block";

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Window,
    Door,
}

impl OpeningKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            OpeningKind::Window => "Window",
            OpeningKind::Door => "Door",
        }
    }
}

impl std::fmt::Display for OpeningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A window or door opening, repeated `amt` times in the wall.
///
/// ```json
/// { "tag": "W1", "kind": "window", "width": 1.2, "height": 1.0, "amt": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub tag: String,
    pub kind: OpeningKind,
    pub width: f64,
    pub height: f64,
    #[serde(default = "one")]
    pub amt: u32,
}

impl Opening {
    pub fn validate(&self) -> BoqResult<()> {
        ensure_positive("width", self.width)?;
        ensure_positive("height", self.height)?;
        ensure_count("amt", self.amt)?;
        Ok(())
    }

    /// Total area of all `amt` openings
    pub fn area(&self) -> f64 {
        self.width * self.height * f64::from(self.amt)
    }

    /// Total jamb lining length of all `amt` openings
    pub fn jamb_length(&self) -> f64 {
        let one = match self.kind {
            OpeningKind::Window => self.width * 2.0 + self.height * 2.0,
            OpeningKind::Door => self.width + self.height * 2.0,
        };
        one * f64::from(self.amt)
    }
}

/// Block wall input as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockWallInput {
    pub tag: String,
    pub unit: UnitSystem,
    pub thickness: f64,
    pub length: f64,
    pub height: f64,
    #[serde(default)]
    pub openings: Vec<Opening>,
}

/// Validated wall with its openings and masonry unit size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockWall {
    pub tag: String,
    pub unit: UnitSystem,
    pub thickness: f64,
    pub length: f64,
    pub height: f64,
    #[serde(skip)]
    openings: Vec<Opening>,
    #[serde(skip)]
    block: BlockSize,
}

impl BlockWall {
    pub fn new(input: &BlockWallInput, detailing: &DetailingConfig) -> BoqResult<Self> {
        ensure_positive("thickness", input.thickness)?;
        ensure_positive("length", input.length)?;
        ensure_positive("height", input.height)?;
        for (i, opening) in input.openings.iter().enumerate() {
            opening.validate().map_err(|e| match e {
                BoqError::Validation { field, value, reason } => BoqError::Validation {
                    field: format!("openings[{}].{}", i, field),
                    value,
                    reason,
                },
                other => other,
            })?;
        }

        let wall = BlockWall {
            tag: input.tag.clone(),
            unit: input.unit,
            thickness: input.thickness,
            length: input.length,
            height: input.height,
            openings: input.openings.clone(),
            block: detailing.block,
        };
        if wall.net_area() < 0.0 {
            return Err(BoqError::validation(
                "openings",
                format!("{}", wall.opening_area()),
                format!("Openings exceed the wall area of {}", wall.gross_area()),
            ));
        }
        Ok(wall)
    }

    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    pub fn gross_area(&self) -> f64 {
        round_to(self.length * self.height, 2)
    }

    pub fn opening_area(&self) -> f64 {
        round_to(self.openings.iter().map(Opening::area).sum(), 2)
    }

    pub fn net_area(&self) -> f64 {
        round_to(self.gross_area() - self.opening_area(), 2)
    }

    /// Rendered area over both faces
    pub fn render_area(&self) -> f64 {
        round_to(self.net_area() * 2.0, 2)
    }

    pub fn jamb_length(&self) -> f64 {
        round_to(self.openings.iter().map(Opening::jamb_length).sum(), 2)
    }

    /// Whole blocks to lay the net area
    pub fn block_count(&self) -> u64 {
        let courses = round_to(self.net_area() / self.block.face_area(), 6);
        if courses <= 0.0 {
            0
        } else {
            courses.ceil() as u64
        }
    }

    pub fn report(&self) -> WallReport {
        let names = self.unit.names();
        WallReport {
            wall: self.clone(),
            openings: self
                .openings
                .iter()
                .map(|opening| OpeningReport {
                    opening: opening.clone(),
                    area: Quantity::new(round_to(opening.area(), 2), names.area),
                    jamb: Quantity::new(round_to(opening.jamb_length(), 2), names.length),
                })
                .collect(),
            area: WallArea {
                gross: Quantity::new(self.gross_area(), names.area),
                openings: Quantity::new(self.opening_area(), names.area),
                net: Quantity::new(self.net_area(), names.area),
            },
            render: Quantity::new(self.render_area(), names.area),
            jambs: Quantity::new(self.jamb_length(), names.length),
            blocks: Quantity::new(self.block_count() as f64, BLOCK_UNIT),
        }
    }
}

impl Geometry for BlockWall {
    fn volume(&self) -> f64 {
        round_to(self.net_area() * self.thickness, 3)
    }

    fn surface_area(&self) -> f64 {
        self.net_area()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpeningReport {
    #[serde(flatten)]
    pub opening: Opening,
    pub area: Quantity,
    pub jamb: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallArea {
    pub gross: Quantity,
    pub openings: Quantity,
    pub net: Quantity,
}

/// Block wall quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallReport {
    pub wall: BlockWall,
    pub openings: Vec<OpeningReport>,
    pub area: WallArea,
    pub render: Quantity,
    pub jambs: Quantity,
    pub blocks: Quantity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> BlockWallInput {
        BlockWallInput {
            tag: "W1".to_string(),
            unit: UnitSystem::Metric,
            thickness: 0.15,
            length: 5.0,
            height: 4.5,
            openings: vec![
                Opening {
                    tag: "W1".to_string(),
                    kind: OpeningKind::Window,
                    width: 1.2,
                    height: 1.0,
                    amt: 2,
                },
                Opening {
                    tag: "D1".to_string(),
                    kind: OpeningKind::Door,
                    width: 0.9,
                    height: 2.1,
                    amt: 1,
                },
            ],
        }
    }

    fn test_wall() -> BlockWall {
        BlockWall::new(&test_input(), &DetailingConfig::metric()).unwrap()
    }

    #[test]
    fn test_areas() {
        let wall = test_wall();
        assert_eq!(wall.gross_area(), 22.5);
        // 2 x 1.2 + 0.9 x 2.1
        assert_eq!(wall.opening_area(), 4.29);
        assert_eq!(wall.net_area(), 18.21);
        assert_eq!(wall.net_area(), round_to(wall.gross_area() - wall.opening_area(), 2));
        assert_eq!(wall.render_area(), 36.42);
    }

    #[test]
    fn test_jambs() {
        let wall = test_wall();
        assert!((wall.openings()[0].jamb_length() - 8.8).abs() < 1e-9);
        assert!((wall.openings()[1].jamb_length() - 5.1).abs() < 1e-9);
        assert_eq!(wall.jamb_length(), 13.9);
    }

    #[test]
    fn test_block_count_rounds_up() {
        let wall = test_wall();
        // 18.21 / 0.08 = 227.6
        assert_eq!(wall.block_count(), 228);
    }

    #[test]
    fn test_exact_block_fit() {
        let mut input = test_input();
        input.openings.clear();
        input.length = 4.0;
        input.height = 2.0;
        let wall = BlockWall::new(&input, &DetailingConfig::metric()).unwrap();
        assert_eq!(wall.block_count(), 100);
    }

    #[test]
    fn test_openings_cannot_exceed_wall() {
        let mut input = test_input();
        input.openings[0].amt = 20;
        match BlockWall::new(&input, &DetailingConfig::metric()).unwrap_err() {
            BoqError::Validation { field, .. } => assert_eq!(field, "openings"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_invalid_opening_named() {
        let mut input = test_input();
        input.openings[1].width = 0.0;
        match BlockWall::new(&input, &DetailingConfig::metric()).unwrap_err() {
            BoqError::Validation { field, .. } => assert_eq!(field, "openings[1].width"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_opening_kind_required() {
        let json = r#"{ "tag": "W1", "width": 1.2, "height": 1.0 }"#;
        assert!(serde_json::from_str::<Opening>(json).is_err());
        let json = r#"{ "tag": "W1", "kind": "door", "width": 0.9, "height": 2.1 }"#;
        let opening: Opening = serde_json::from_str(json).unwrap();
        assert_eq!(opening.kind, OpeningKind::Door);
        assert_eq!(opening.amt, 1);
    }

    #[test]
    fn test_report_shape() {
        let json = serde_json::to_value(test_wall().report()).unwrap();
        assert_eq!(json["wall"]["tag"], "W1");
        assert!(json["wall"].get("openings").is_none());
        assert_eq!(json["openings"][0]["kind"], "window");
        assert_eq!(json["openings"][1]["jamb"]["value"], 5.1);
        assert_eq!(json["area"]["net"]["value"], 18.21);
        assert_eq!(json["render"]["unit"], "m2");
        assert_eq!(json["jambs"]["unit"], "m");
        assert_eq!(json["blocks"]["value"], 228.0);
    }

    #[test]
    fn test_volume() {
        let mut input = test_input();
        input.thickness = 0.2;
        let wall = BlockWall::new(&input, &DetailingConfig::metric()).unwrap();
        assert_eq!(wall.volume(), 3.642);
    }
}
