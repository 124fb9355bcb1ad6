//! # Unit Systems
//!
//! Resolution of a declared unit token into the set of unit names used for
//! reporting, plus the `{value, unit}` leaf that every report is built from.
//!
//! ## Recognized Tokens
//!
//! | Token | System | length | area | volume | mass |
//! |---|---|---|---|---|---|
//! | `m`, `metric` | Metric | m | m2 | m3 | kg |
//! | `ft`, `imperial` | Imperial | ft | ft2 | ft3 | lb |
//!
//! Any other token is rejected with a configuration error. There is no
//! "anything that is not metric is imperial" fallback.
//!
//! ## Example
//!
//! ```rust
//! use boq_core::units::{resolve, UnitSystem};
//!
//! let names = resolve("m").unwrap();
//! assert_eq!(names.area, "m2");
//!
//! assert_eq!(UnitSystem::from_token("ft").unwrap(), UnitSystem::Imperial);
//! assert!(resolve("yd").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{BoqError, BoqResult};

/// System of measurement declared by an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UnitSystem {
    /// Metres, square metres, cubic metres, kilograms
    #[default]
    Metric,
    /// Feet, square feet, cubic feet, pounds
    Imperial,
}

impl UnitSystem {
    /// Parse a caller-supplied unit token.
    pub fn from_token(token: &str) -> BoqResult<Self> {
        match token.trim().to_lowercase().as_str() {
            "m" | "metric" => Ok(UnitSystem::Metric),
            "ft" | "imperial" => Ok(UnitSystem::Imperial),
            other => Err(BoqError::configuration(
                "unit",
                format!("unrecognized unit token '{}' (expected 'm' or 'ft')", other),
            )),
        }
    }

    /// Canonical token written back into reports and files
    pub fn token(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m",
            UnitSystem::Imperial => "ft",
        }
    }

    /// Reporting unit names for this system
    pub fn names(&self) -> UnitNames {
        match self {
            UnitSystem::Metric => UnitNames {
                length: "m",
                area: "m2",
                volume: "m3",
                mass: "kg",
            },
            UnitSystem::Imperial => UnitNames {
                length: "ft",
                area: "ft2",
                volume: "ft3",
                mass: "lb",
            },
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for UnitSystem {
    type Err = BoqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitSystem::from_token(s)
    }
}

impl TryFrom<String> for UnitSystem {
    type Error = BoqError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UnitSystem::from_token(&value)
    }
}

impl From<UnitSystem> for String {
    fn from(system: UnitSystem) -> Self {
        system.token().to_string()
    }
}

/// The four unit names an element report is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitNames {
    pub length: &'static str,
    pub area: &'static str,
    pub volume: &'static str,
    pub mass: &'static str,
}

/// Resolve a unit token straight to its reporting names.
pub fn resolve(token: &str) -> BoqResult<UnitNames> {
    Ok(UnitSystem::from_token(token)?.names())
}

/// A numeric report leaf tagged with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Quantity {
            value,
            unit: unit.into(),
        }
    }
}

/// Round to `places` decimals, halves away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Round a non-negative ratio to a whole count, halves away from zero.
pub fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_metric() {
        let names = resolve("m").unwrap();
        assert_eq!(names.length, "m");
        assert_eq!(names.area, "m2");
        assert_eq!(names.volume, "m3");
        assert_eq!(names.mass, "kg");
    }

    #[test]
    fn test_resolve_imperial() {
        let names = resolve("ft").unwrap();
        assert_eq!(names.length, "ft");
        assert_eq!(names.area, "ft2");
        assert_eq!(names.volume, "ft3");
        assert_eq!(names.mass, "lb");
        assert_eq!(resolve(" Imperial ").unwrap(), names);
    }

    #[test]
    fn test_unknown_token_is_configuration_error() {
        let err = resolve("yd").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert!(resolve("").is_err());
    }

    #[test]
    fn test_serde_uses_token() {
        let json = serde_json::to_string(&UnitSystem::Imperial).unwrap();
        assert_eq!(json, "\"ft\"");
        let parsed: UnitSystem = serde_json::from_str("\"metric\"").unwrap();
        assert_eq!(parsed, UnitSystem::Metric);
        let bad: Result<UnitSystem, _> = serde_json::from_str("\"cubits\"");
        assert!(bad.unwrap_err().to_string().contains("unrecognized unit token"));
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(round_count(2.5), 3);
        assert_eq!(round_count(1.5), 2);
        assert_eq!(round_count(1.49), 1);
        assert_eq!(round_count(-3.0), 0);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(1.2346, 3), 1.235);
        assert_eq!(round_to(57.8, 2), 57.8);
    }

    #[test]
    fn test_quantity_shape() {
        let q = Quantity::new(1.23, "m3");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["value"], 1.23);
        assert_eq!(json["unit"], "m3");
    }
}
