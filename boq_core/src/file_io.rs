//! # File I/O
//!
//! Estimate and openings files share the same safety features:
//! - **Atomic saves**: write to a `.tmp` sibling, fsync, then rename
//! - **File locking**: an OS lock plus a `.lock` file naming the holder
//! - **Version validation**: estimates must match the schema major version
//!
//! ## Example
//!
//! ```rust,no_run
//! use boq_core::estimate::Estimate;
//! use boq_core::file_io::{save_estimate, load_estimate, FileLock};
//! use std::path::Path;
//!
//! let estimate = Estimate::new("Block B", "QS");
//! let path = Path::new("block_b.boq");
//!
//! let lock = FileLock::acquire(path, "qs@office")?;
//! save_estimate(&estimate, path)?;
//! drop(lock);
//!
//! let loaded = load_estimate(path)?;
//! # Ok::<(), boq_core::errors::BoqError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{BoqError, BoqResult};
use crate::estimate::{Estimate, SCHEMA_VERSION};

/// Extension of estimate files
pub const ESTIMATE_EXTENSION: &str = "boq";

/// Metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a data file, released on drop.
pub struct FileLock {
    path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`.
    ///
    /// Fails with [`BoqError::FileLocked`] while another live process holds
    /// it. Locks left behind by dead processes, or older than a day, are
    /// taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> BoqResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = FileLock::check(path) {
            return Err(BoqError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                BoqError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file.try_lock_exclusive().map_err(|_| {
            BoqError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(BoqError::serialization)?;
        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            BoqError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;
        lock_file.sync_all().map_err(|e| {
            BoqError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        tracing::debug!(path = %path.display(), user = %info.user_id, "acquired file lock");
        Ok(FileLock {
            path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of the lock on `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_json::<LockInfo>(&lock_path)
            .ok()
            .filter(|info| !is_lock_stale(info))
    }

    /// The locked data file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `<file>.<ext>.lock` next to the data file
fn lock_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "lock")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let extension = sibling
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    sibling.set_extension(extension);
    sibling
}

fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }
    (Utc::now() - info.locked_at).num_hours() > 24
}

/// Write `value` as pretty JSON with atomic rename semantics.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> BoqResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(BoqError::serialization)?;
    let tmp_path = sibling_with_suffix(path, "tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        BoqError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        BoqError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.sync_all().map_err(|e| {
        BoqError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        BoqError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> BoqResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| BoqError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|e| BoqError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Save an estimate atomically.
pub fn save_estimate(estimate: &Estimate, path: &Path) -> BoqResult<()> {
    write_json_atomic(estimate, path)?;
    tracing::debug!(
        path = %path.display(),
        sections = estimate.sections.len(),
        "saved estimate"
    );
    Ok(())
}

/// Load an estimate, rejecting incompatible schema versions.
pub fn load_estimate(path: &Path) -> BoqResult<Estimate> {
    let estimate: Estimate = read_json(path)?;
    validate_version(&estimate.meta.version)?;
    Ok(estimate)
}

/// Load an estimate along with the current lock holder, if any.
pub fn load_estimate_with_lock_check(path: &Path) -> BoqResult<(Estimate, Option<LockInfo>)> {
    let estimate = load_estimate(path)?;
    Ok((estimate, FileLock::check(path)))
}

/// Same major version required; within 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> BoqResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);
    let mismatch = || BoqError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, rest @ ..], [current_major, current_rest @ ..]) => {
            if file_major != current_major {
                return Err(mismatch());
            }
            if *current_major == 0 {
                if let (Some(file_minor), Some(current_minor)) = (rest.first(), current_rest.first()) {
                    if file_minor > current_minor {
                        return Err(mismatch());
                    }
                }
            }
            Ok(())
        }
        _ => Err(mismatch()),
    }
}
