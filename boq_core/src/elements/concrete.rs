//! Concrete mix quantities shared by every cast element.
//!
//! ```text
//! dry   = volume * amt
//! wet   = dry * wet_volume_factor
//! mass  = round(dry * factor, 3)          (cement, fine and coarse aggregate, water)
//! bags  = round(cement / bag_weight + 0.5)
//! ```
//!
//! The `+ 0.5` biases the bag count upward so a part bag is always ordered.

use serde::Serialize;

use crate::errors::BoqResult;
use crate::library::{MixFactor, PerSystem, ReferenceLibrary};
use crate::units::{round_count, round_to, Quantity, UnitSystem};

/// Unit label for whole cement bags
pub const BAG_UNIT: &str = "bag";

/// Cement mass with the number of bags to order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CementQuantity {
    pub value: f64,
    pub unit: String,
    pub bag: Quantity,
}

/// Concrete section of an element report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcreteReport {
    pub grade: String,
    pub dry_volume: Quantity,
    pub wet_volume: Quantity,
    pub cement: CementQuantity,
    pub fine_agg: Quantity,
    pub coarse_agg: Quantity,
    pub water: Quantity,
}

/// Bags needed for a cement mass, biased toward the next whole bag.
pub fn cement_bags(cement_mass: f64, bag_weight: f64) -> u64 {
    round_count(cement_mass / bag_weight + 0.5)
}

/// Derive mix quantities for `amt` pours of `volume` in `grade` concrete.
pub fn concrete_report(
    lib: &dyn ReferenceLibrary,
    grade: &str,
    system: UnitSystem,
    volume: f64,
    amt: u32,
) -> BoqResult<ConcreteReport> {
    let mix = lib.concrete_mix(grade)?;
    let legend = lib.mix_legend();
    let names = system.names();

    let dry = round_to(volume * f64::from(amt), 3);
    let wet = round_to(dry * legend.wet_volume_factor, 3);

    let material = |factor: &PerSystem<MixFactor>| {
        let f = factor.get(system);
        Quantity::new(round_to(dry * f.factor(), 3), f.unit())
    };

    let cement = material(&mix.material.cement);
    let bag_weight = legend.bag_weight.get(system);
    let bags = cement_bags(cement.value, bag_weight.factor());

    Ok(ConcreteReport {
        grade: mix.grade.clone(),
        dry_volume: Quantity::new(dry, names.volume),
        wet_volume: Quantity::new(wet, names.volume),
        cement: CementQuantity {
            value: cement.value,
            unit: cement.unit,
            bag: Quantity::new(bags as f64, BAG_UNIT),
        },
        fine_agg: material(&mix.material.fine_agg),
        coarse_agg: material(&mix.material.coarse_agg),
        water: material(&mix.material.water),
    })
}
