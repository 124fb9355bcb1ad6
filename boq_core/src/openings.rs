//! # Openings Store
//!
//! Window and door schedules kept apart from the walls they belong to,
//! keyed by wall tag. The store is a single JSON file; every mutation takes
//! the file lock and rewrites the file atomically.
//!
//! ```rust,no_run
//! use boq_core::elements::{Opening, OpeningKind};
//! use boq_core::openings::OpeningStore;
//!
//! let store = OpeningStore::open("wall_openings.json", "qs@office");
//! store.save("W1", Opening {
//!     tag: "D1".into(),
//!     kind: OpeningKind::Door,
//!     width: 0.9,
//!     height: 2.1,
//!     amt: 1,
//! })?;
//! let doors = store.find_by("W1")?;
//! # Ok::<(), boq_core::errors::BoqError>(())
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::elements::{BlockWallInput, Opening};
use crate::errors::BoqResult;
use crate::file_io::{read_json, write_json_atomic, FileLock};

/// One stored opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningRecord {
    pub id: Uuid,
    pub wall_tag: String,
    pub created: DateTime<Utc>,
    #[serde(flatten)]
    pub opening: Opening,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpeningsFile {
    #[serde(default)]
    openings: Vec<OpeningRecord>,
}

/// File-backed openings store.
#[derive(Debug, Clone)]
pub struct OpeningStore {
    path: PathBuf,
    user_id: String,
}

impl OpeningStore {
    /// Bind a store to `path`. The file is created on first save.
    pub fn open(path: impl AsRef<Path>, user_id: impl Into<String>) -> Self {
        OpeningStore {
            path: path.as_ref().to_path_buf(),
            user_id: user_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store an opening against `wall_tag`; returns that wall's openings.
    pub fn save(&self, wall_tag: &str, opening: Opening) -> BoqResult<Vec<OpeningRecord>> {
        opening.validate()?;
        let _lock = FileLock::acquire(&self.path, &self.user_id)?;
        let mut file = self.read()?;
        let record = OpeningRecord {
            id: Uuid::new_v4(),
            wall_tag: wall_tag.to_string(),
            created: Utc::now(),
            opening,
        };
        tracing::debug!(wall = wall_tag, opening = %record.opening.tag, id = %record.id, "stored opening");
        file.openings.push(record);
        write_json_atomic(&file, &self.path)?;
        Ok(matching(&file.openings, wall_tag))
    }

    /// Openings stored against `wall_tag`, oldest first.
    pub fn find_by(&self, wall_tag: &str) -> BoqResult<Vec<OpeningRecord>> {
        Ok(matching(&self.read()?.openings, wall_tag))
    }

    /// Remove every opening of `wall_tag`; returns how many were removed.
    pub fn delete_by(&self, wall_tag: &str) -> BoqResult<usize> {
        let _lock = FileLock::acquire(&self.path, &self.user_id)?;
        let mut file = self.read()?;
        let before = file.openings.len();
        file.openings.retain(|r| r.wall_tag != wall_tag);
        let removed = before - file.openings.len();
        if removed > 0 {
            write_json_atomic(&file, &self.path)?;
        }
        tracing::debug!(wall = wall_tag, removed, "deleted openings");
        Ok(removed)
    }

    pub fn list_all(&self) -> BoqResult<Vec<OpeningRecord>> {
        Ok(self.read()?.openings)
    }

    /// Append the stored openings of a wall to its input.
    pub fn attach(&self, wall: &mut BlockWallInput) -> BoqResult<usize> {
        let stored = self.find_by(&wall.tag)?;
        let count = stored.len();
        wall.openings.extend(stored.into_iter().map(|r| r.opening));
        Ok(count)
    }

    fn read(&self) -> BoqResult<OpeningsFile> {
        if !self.path.exists() {
            return Ok(OpeningsFile::default());
        }
        read_json(&self.path)
    }
}

fn matching(records: &[OpeningRecord], wall_tag: &str) -> Vec<OpeningRecord> {
    records
        .iter()
        .filter(|r| r.wall_tag == wall_tag)
        .cloned()
        .collect()
}
