//! # boq_core - Bill of Quantities Engine
//!
//! `boq_core` derives material takeoffs for reinforced-concrete and masonry
//! building elements: concrete and mix constituents, formwork, earthwork,
//! block and render areas, and reinforcement (stock bars, cut lengths and
//! weights). All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: each report is built fresh from its input
//! - **JSON-First**: every numeric output is a `{value, unit}` pair
//! - **Rich Errors**: structured error types, not just strings
//! - **Explicit units**: an element declares `m` or `ft`; nothing is guessed
//!
//! ## Quick Start
//!
//! ```rust
//! use boq_core::report::Estimator;
//!
//! let estimator = Estimator::standard().unwrap();
//! let report = estimator.report_json(r#"{
//!     "type": "BlockWall", "tag": "W1", "unit": "m",
//!     "thickness": 0.15, "length": 5.0, "height": 3.0,
//!     "openings": [{ "tag": "D1", "kind": "door", "width": 0.9, "height": 2.1 }]
//! }"#).unwrap();
//!
//! assert_eq!(report["area"]["net"]["value"], 13.11);
//! ```
//!
//! ## Modules
//!
//! - [`elements`] - columns, beams, footings, slabs, floors and block walls
//! - [`rebar`] - main bars, stirrups and links
//! - [`library`] - bar and concrete mix reference tables
//! - [`report`] - report assembly for any element
//! - [`estimate`] - sectioned estimate documents
//! - [`openings`] - file-backed wall openings store
//! - [`settings`] - detailing constants (cover, laps, block size)
//! - [`units`] - unit systems, quantities and rounding
//! - [`errors`] - structured error types
//! - [`file_io`] - atomic saves and file locking

pub mod elements;
pub mod errors;
pub mod estimate;
pub mod file_io;
pub mod library;
pub mod openings;
pub mod rebar;
pub mod report;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use elements::{ElementInput, ElementKind};
pub use errors::{BoqError, BoqResult};
pub use estimate::{Estimate, Section};
pub use file_io::{load_estimate, save_estimate, FileLock};
pub use library::{ReferenceLibrary, TableLibrary};
pub use report::{ElementReport, Estimator};
pub use settings::{DetailingConfig, Settings};
pub use units::{Quantity, UnitSystem};
