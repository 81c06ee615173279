//! Snapshot files: the persisted form of a collection.
//!
//! A snapshot is a pretty-printed JSON document whose file name ends in
//! [`SNAPSHOT_SUFFIX`]:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "settings": { "log_retention": 30, "screenshot_dir": "Screenshots", "online_start_scene": null },
//!   "groups": [
//!     { "name": "Build", "items": [ { "type": "Command", "label": "Build", "menu_path": "File/Build" } ] }
//!   ]
//! }
//! ```
//!
//! Every item record carries an explicit `type` tag naming its variant.

use crate::collection::Collection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name suffix identifying snapshot files
pub const SNAPSHOT_SUFFIX: &str = ".shelf.json";

/// Snapshot format written by this version
pub const FORMAT_VERSION: u32 = 1;

/// Identifier of a persisted snapshot (its path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(PathBuf);

impl SnapshotId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File name without the snapshot suffix
    pub fn display_name(&self) -> String {
        let file_name = self
            .0
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        file_name
            .strip_suffix(SNAPSHOT_SUFFIX)
            .map(str::to_string)
            .unwrap_or(file_name)
    }

    /// Directory holding the snapshot
    pub fn directory(&self) -> Option<&Path> {
        self.0.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Returns true if `path` names a snapshot file
pub fn is_snapshot_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > SNAPSHOT_SUFFIX.len() && n.ends_with(SNAPSHOT_SUFFIX))
}

/// File name for a snapshot called `name`
pub fn snapshot_file_name(name: &str) -> String {
    if name.ends_with(SNAPSHOT_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, SNAPSHOT_SUFFIX)
    }
}

/// Errors reading or writing snapshot files
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot {path:?} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot {path:?} uses format version {found}, newest supported is {}", FORMAT_VERSION)]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

fn current_version() -> u32 {
    FORMAT_VERSION
}

#[derive(Serialize, Deserialize)]
struct SnapshotRecord {
    #[serde(default = "current_version")]
    format_version: u32,
    #[serde(flatten)]
    collection: Collection,
}

#[derive(Serialize)]
struct SnapshotRecordRef<'a> {
    format_version: u32,
    #[serde(flatten)]
    collection: &'a Collection,
}

/// Serialize a collection to snapshot JSON
pub fn to_json(collection: &Collection) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SnapshotRecordRef {
        format_version: FORMAT_VERSION,
        collection,
    })
}

/// Parse snapshot JSON; `path` is only used for error messages
pub fn from_json(content: &str, path: &Path) -> Result<Collection, SnapshotError> {
    let record: SnapshotRecord =
        serde_json::from_str(content).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if record.format_version > FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: record.format_version,
        });
    }
    Ok(record.collection)
}

/// Load a collection from a snapshot file
pub fn read_snapshot(path: &Path) -> Result<Collection, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&content, path)
}

/// Write a collection to a snapshot file.
///
/// The document is written to a sibling temporary file first and renamed
/// over `path`, so a failed write leaves any existing snapshot intact.
pub fn write_snapshot(path: &Path, collection: &Collection) -> Result<(), SnapshotError> {
    let json = to_json(collection).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    let write_err = |source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, json).map_err(write_err)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    Ok(())
}
