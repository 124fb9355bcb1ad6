//! # Estimate Documents
//!
//! An `Estimate` groups element inputs into titled sections (substructure,
//! frame, walling, ...). Estimates serialize to `.boq` files as
//! human-readable JSON; see [`crate::file_io`] for saving and loading.
//!
//! ## Structure
//!
//! ```text
//! Estimate
//! ├── meta: EstimateMeta (version, titles, author, timestamps)
//! └── sections: Vec<Section>
//!     └── items: Vec<ElementInput>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use boq_core::estimate::Estimate;
//!
//! let mut estimate = Estimate::new("Warehouse Extension", "QS Office");
//! let id = estimate.add_section("Substructure");
//! assert!(estimate.section(&id).is_some());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::elements::ElementInput;
use crate::errors::BoqResult;
use crate::library::ReferenceLibrary;
use crate::report::{ElementReport, Estimator};
use crate::settings::Settings;

/// Current schema version for .boq files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root estimate container, the top-level struct of a `.boq` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub meta: EstimateMeta,

    /// Sections in display order
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Estimate {
    /// Create an empty estimate.
    ///
    /// ```rust
    /// use boq_core::estimate::Estimate;
    ///
    /// let estimate = Estimate::new("Block B", "J. Surveyor");
    /// assert_eq!(estimate.meta.title, "Block B");
    /// assert_eq!(estimate.item_count(), 0);
    /// ```
    pub fn new(title: impl Into<String>, created_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Estimate {
            meta: EstimateMeta {
                version: SCHEMA_VERSION.to_string(),
                title: title.into(),
                subtitle: None,
                project: None,
                created_by: created_by.into(),
                created: now,
                modified: now,
            },
            sections: Vec::new(),
        }
    }

    /// Append an empty section and return its id.
    pub fn add_section(&mut self, title: impl Into<String>) -> Uuid {
        let section = Section::new(title);
        let id = section.id;
        self.sections.push(section);
        self.touch();
        id
    }

    /// Remove a section by id, returning it if it existed.
    pub fn remove_section(&mut self, id: &Uuid) -> Option<Section> {
        let index = self.sections.iter().position(|s| &s.id == id)?;
        let section = self.sections.remove(index);
        self.touch();
        Some(section)
    }

    pub fn section(&self, id: &Uuid) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Mutable access to a section. Marks the estimate as modified.
    pub fn section_mut(&mut self, id: &Uuid) -> Option<&mut Section> {
        let index = self.sections.iter().position(|s| &s.id == id)?;
        self.touch();
        self.sections.get_mut(index)
    }

    /// Add an element to a section. Returns false if the section is unknown.
    pub fn add_item(&mut self, section: &Uuid, item: ElementInput) -> bool {
        match self.section_mut(section) {
            Some(s) => {
                s.items.push(item);
                true
            }
            None => false,
        }
    }

    /// Total number of elements across all sections
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Build the report of every element, section by section.
    ///
    /// Stops at the first element that fails.
    pub fn reports(
        &self,
        library: &dyn ReferenceLibrary,
        settings: &Settings,
    ) -> BoqResult<Vec<SectionReport>> {
        let estimator = Estimator::new(library, *settings)?;
        self.sections
            .iter()
            .map(|section| {
                let items = section
                    .items
                    .iter()
                    .map(|item| estimator.report(item))
                    .collect::<BoqResult<Vec<_>>>()?;
                Ok(SectionReport {
                    id: section.id,
                    title: section.title.clone(),
                    items,
                })
            })
            .collect()
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Estimate::new("", "")
    }
}

/// Estimate metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateMeta {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Project name or job number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub created_by: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// A titled group of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub items: Vec<ElementInput>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Section {
            id: Uuid::new_v4(),
            title: title.into(),
            items: Vec::new(),
        }
    }
}

/// Reports for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub id: Uuid,
    pub title: String,
    pub items: Vec<ElementReport>,
}
