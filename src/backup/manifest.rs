use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Manifest file name inside the backup directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// One backed-up file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path of the original file, relative to the repository root
    pub original: String,
    /// Path of the copy; relative paths are resolved against the repository root
    pub backup: PathBuf,
}

/// Record of the most recent backup session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    /// When the backup was taken
    pub timestamp: DateTime<Utc>,
    /// Successfully backed-up files, in backup order
    pub files: Vec<ManifestEntry>,
}

impl BackupManifest {
    /// New manifest stamped with the current time
    pub fn new(files: Vec<ManifestEntry>) -> Self {
        Self {
            timestamp: Utc::now(),
            files,
        }
    }

    /// Read and parse a manifest.
    ///
    /// A missing or unreadable file is a [`Error::Backup`]; content that is not
    /// a manifest is a [`Error::Manifest`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Backup(format!("cannot read manifest '{}': {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Write the manifest, replacing any previous one
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        fs::write(path, content).map_err(|e| Error::file_access("write", path, e))
    }
}
