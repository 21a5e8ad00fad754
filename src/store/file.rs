//! Local snapshot file.
//!
//! The whole seen record is serialized with `bincode` behind a small
//! header and rewritten every cycle.  The format is versioned but carries
//! no cross-version compatibility promise: a snapshot written by another
//! format version is reported as an error rather than silently discarded.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::PersistenceStore;
use crate::error::PersistenceError;
use crate::source::Item;

/// Format version written into every snapshot header.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [Item],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    items: Vec<Item>,
}

/// One snapshot file per watcher.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
    label: String,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("snapshot {}", path.display());
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Sibling file the snapshot is staged in before being renamed over the
    /// real one.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceStore for FileSnapshotStore {
    fn name(&self) -> &str {
        &self.label
    }

    fn load(&mut self) -> Result<Vec<Item>, PersistenceError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no snapshot yet");
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;

        // The version is the leading field, so it can be checked before the
        // rest of the layout is trusted.
        let version: u32 =
            bincode::deserialize(&bytes).map_err(|source| PersistenceError::Decode {
                path: self.path.clone(),
                source,
            })?;
        if version != SNAPSHOT_VERSION {
            return Err(PersistenceError::Version {
                path: self.path.clone(),
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let snapshot: Snapshot =
            bincode::deserialize(&bytes).map_err(|source| PersistenceError::Decode {
                path: self.path.clone(),
                source,
            })?;
        info!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            saved_at = %snapshot.saved_at,
            version = snapshot.version,
            "loaded snapshot"
        );
        Ok(snapshot.items)
    }

    fn record(&mut self, seen: &[Item], _fresh: &[Item]) -> Result<(), PersistenceError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            items: seen,
        };
        let bytes = bincode::serialize(&snapshot).map_err(|source| PersistenceError::Encode {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let staging = self.staging_path();
        let mut file = fs::File::create(&staging).map_err(|e| self.io_error(e))?;
        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), items = seen.len(), "snapshot written");
        Ok(())
    }
}
