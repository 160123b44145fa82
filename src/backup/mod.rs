//! Mirrored backup tree with a manifest, restore and cleanup.
//!
//! A backup is a single last-write-wins snapshot: every session overwrites the
//! manifest and any copy already stored at the same relative path.

pub mod manifest;

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
pub use manifest::{BackupManifest, ManifestEntry, MANIFEST_FILE};

/// A file that could not be backed up or restored
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub path: String,
    pub message: String,
}

/// Result of [`BackupManager::backup_all`]
#[derive(Debug, Clone, Default)]
pub struct BackupReport {
    pub entries: Vec<ManifestEntry>,
    pub failures: Vec<ItemFailure>,
}

/// Result of [`BackupManager::restore`]
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub timestamp: DateTime<Utc>,
    pub restored_count: usize,
    pub total_files: usize,
    pub failures: Vec<ItemFailure>,
}

/// Summary of the current backup, see [`BackupManager::info`]
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub timestamp: DateTime<Utc>,
    pub file_count: usize,
    pub original_paths: Vec<String>,
}

/// Check that `name` is a single plain directory name. The backup root and
/// everything [`BackupManager::cleanup`] removes must stay inside the repository.
pub fn validate_dir_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single
        || name.trim().is_empty()
        || name.contains(|c: char| c == '/' || c == '\\')
        || name.eq_ignore_ascii_case(".git")
    {
        return Err(Error::Backup(format!(
            "'{}' is not a valid backup directory name (expected a single directory \
             name inside the repository)",
            name
        )));
    }
    Ok(())
}

/// Backs up and restores files under one repository root
#[derive(Debug, Clone)]
pub struct BackupManager {
    repo_root: PathBuf,
    dir_name: String,
}

impl BackupManager {
    /// Create a manager storing backups in `repo_root/dir_name`
    pub fn new(repo_root: impl Into<PathBuf>, dir_name: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            dir_name: dir_name.into(),
        }
    }

    /// Absolute path of the backup directory
    pub fn backup_root(&self) -> PathBuf {
        self.repo_root.join(&self.dir_name)
    }

    /// Name of the backup directory relative to the repository root
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Backup directory, refusing names that would leave the repository
    fn checked_root(&self) -> Result<PathBuf> {
        validate_dir_name(&self.dir_name)?;
        Ok(self.backup_root())
    }

    fn manifest_path(&self) -> PathBuf {
        self.backup_root().join(MANIFEST_FILE)
    }

    /// Copy each of `paths` into the backup tree and write a fresh manifest.
    ///
    /// Files that fail to copy are reported and left out of the manifest.
    pub fn backup_all<S: AsRef<str>>(&self, paths: &[S]) -> Result<BackupReport> {
        let backup_root = self.checked_root()?;
        fs::create_dir_all(&backup_root)
            .map_err(|e| Error::file_access("create directory", &backup_root, e))?;

        let mut report = BackupReport::default();

        for path in paths {
            let path = path.as_ref();
            match self.backup_file(path) {
                Ok(entry) => {
                    debug!(path, backup = %entry.backup.display(), "backed up file");
                    report.entries.push(entry);
                }
                Err(e) => {
                    warn!(path, error = %e, "backup failed");
                    report.failures.push(ItemFailure {
                        path: path.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        BackupManifest::new(report.entries.clone()).save(&self.manifest_path())?;
        info!(
            backed_up = report.entries.len(),
            failed = report.failures.len(),
            "backup manifest written"
        );

        Ok(report)
    }

    fn backup_file(&self, path: &str) -> Result<ManifestEntry> {
        let relative = self.relative_path(path)?;
        let source = self.repo_root.join(&relative);
        let backup_relative = Path::new(&self.dir_name).join(&relative);
        let destination = self.repo_root.join(&backup_relative);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::file_access("create directory", parent, e))?;
        }
        fs::copy(&source, &destination).map_err(|e| Error::file_access("copy", &source, e))?;

        Ok(ManifestEntry {
            original: relative.to_string_lossy().into_owned(),
            backup: backup_relative,
        })
    }

    /// Normalize `path` to a path relative to the repository root
    fn relative_path(&self, path: &str) -> Result<PathBuf> {
        let path = Path::new(path);
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.repo_root).map_err(|_| {
                Error::Backup(format!("'{}' is outside the repository", path.display()))
            })?
        } else {
            path
        };

        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(Error::Backup(format!(
                "'{}' escapes the repository",
                path.display()
            )));
        }

        Ok(relative.to_path_buf())
    }

    /// Whether a backup directory exists
    pub fn has_backup(&self) -> bool {
        self.checked_root().map(|root| root.is_dir()).unwrap_or(false)
    }

    /// Copy every manifest entry back over its original.
    ///
    /// Fails if there is no backup or the manifest is unreadable; individual
    /// copy failures are reported in the result instead.
    pub fn restore(&self) -> Result<RestoreReport> {
        self.checked_root()?;
        if !self.has_backup() {
            return Err(Error::Backup(format!(
                "no backup found at '{}'",
                self.backup_root().display()
            )));
        }

        let manifest = BackupManifest::load(&self.manifest_path())?;
        info!(timestamp = %manifest.timestamp, files = manifest.files.len(), "restoring backup");

        let mut restored_count = 0;
        let mut failures = Vec::new();

        for entry in &manifest.files {
            match self.restore_entry(entry) {
                Ok(()) => {
                    debug!(path = %entry.original, "restored file");
                    restored_count += 1;
                }
                Err(e) => {
                    warn!(path = %entry.original, error = %e, "restore failed");
                    failures.push(ItemFailure {
                        path: entry.original.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(RestoreReport {
            timestamp: manifest.timestamp,
            restored_count,
            total_files: manifest.files.len(),
            failures,
        })
    }

    fn restore_entry(&self, entry: &ManifestEntry) -> Result<()> {
        let relative = self.relative_path(&entry.original)?;
        let original = self.repo_root.join(relative);
        let backup = if entry.backup.is_absolute() {
            entry.backup.clone()
        } else {
            self.repo_root.join(&entry.backup)
        };

        if let Some(parent) = original.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::file_access("create directory", parent, e))?;
        }
        fs::copy(&backup, &original).map_err(|e| Error::file_access("copy", &backup, e))?;
        Ok(())
    }

    /// Describe the current backup; `None` if absent or unreadable
    pub fn info(&self) -> Option<BackupInfo> {
        if !self.has_backup() {
            return None;
        }

        match self.load_info() {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(error = %e, "backup manifest unreadable");
                None
            }
        }
    }

    /// Like [`BackupManager::info`], but reports why the backup is unusable
    pub fn load_info(&self) -> Result<BackupInfo> {
        let backup_root = self.checked_root()?;
        if !backup_root.is_dir() {
            return Err(Error::Backup(format!(
                "no backup found at '{}'",
                backup_root.display()
            )));
        }

        let manifest = BackupManifest::load(&self.manifest_path())?;
        Ok(BackupInfo {
            timestamp: manifest.timestamp,
            file_count: manifest.files.len(),
            original_paths: manifest.files.into_iter().map(|f| f.original).collect(),
        })
    }

    /// Delete the backup directory. Returns whether anything was removed.
    pub fn cleanup(&self) -> Result<bool> {
        let backup_root = self.checked_root()?;
        if !backup_root.is_dir() {
            return Ok(false);
        }

        fs::remove_dir_all(&backup_root)
            .map_err(|e| Error::file_access("remove", &backup_root, e))?;
        info!(path = %backup_root.display(), "backup removed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DIR: &str = ".test-backup";
    const DEFAULT_NAME: &str = crate::config::DEFAULT_BACKUP_DIR;

    fn setup() -> (TempDir, BackupManager) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("a.txt"), "alpha\n").unwrap();
        fs::write(dir.path().join("src/nested/b.rs"), "fn b() {}\r\n").unwrap();
        let manager = BackupManager::new(dir.path(), DIR);
        (dir, manager)
    }

    #[test]
    fn test_backup_creates_mirrored_tree() {
        let (dir, manager) = setup();
        let report = manager.backup_all(&["a.txt", "src/nested/b.rs"]).unwrap();

        assert_eq!(report.entries.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join(DIR).join("src/nested/b.rs")).unwrap(),
            "fn b() {}\r\n"
        );
        assert!(dir.path().join(DIR).join(MANIFEST_FILE).is_file());
        assert_eq!(report.entries[1].backup, Path::new(DIR).join("src/nested/b.rs"));
    }

    #[test]
    fn test_backup_restore_roundtrip() {
        let (dir, manager) = setup();
        manager.backup_all(&["a.txt", "src/nested/b.rs"]).unwrap();

        fs::write(dir.path().join("a.txt"), "changed").unwrap();
        fs::remove_file(dir.path().join("src/nested/b.rs")).unwrap();

        let report = manager.restore().unwrap();
        assert_eq!(report.restored_count, 2);
        assert_eq!(report.total_files, 2);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "alpha\n");
        assert_eq!(
            fs::read(dir.path().join("src/nested/b.rs")).unwrap(),
            b"fn b() {}\r\n"
        );
    }

    #[test]
    fn test_failed_backup_is_left_out_of_manifest() {
        let (_dir, manager) = setup();
        let report = manager.backup_all(&["a.txt", "missing.txt", "../escape.txt"]).unwrap();

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].path, "missing.txt");

        let info = manager.info().unwrap();
        assert_eq!(info.file_count, 1);
        assert_eq!(info.original_paths, vec!["a.txt"]);
    }

    #[test]
    fn test_absolute_path_inside_repo() {
        let (dir, manager) = setup();
        let absolute = dir.path().join("a.txt");
        let report = manager
            .backup_all(&[absolute.to_string_lossy().into_owned()])
            .unwrap();
        assert_eq!(report.entries[0].original, "a.txt");
    }

    #[test]
    fn test_new_backup_overwrites_previous() {
        let (dir, manager) = setup();
        manager.backup_all(&["a.txt", "src/nested/b.rs"]).unwrap();

        fs::write(dir.path().join("a.txt"), "second").unwrap();
        manager.backup_all(&["a.txt"]).unwrap();

        let info = manager.info().unwrap();
        assert_eq!(info.file_count, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join(DIR).join("a.txt")).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_restore_without_backup() {
        let (_dir, manager) = setup();
        assert!(!manager.has_backup());
        assert!(matches!(manager.restore(), Err(Error::Backup(_))));
        assert!(manager.info().is_none());
    }

    #[test]
    fn test_restore_with_missing_manifest() {
        let (dir, manager) = setup();
        fs::create_dir_all(dir.path().join(DIR)).unwrap();

        assert!(manager.has_backup());
        assert!(matches!(manager.restore(), Err(Error::Backup(_))));
        assert!(manager.info().is_none());
    }

    #[test]
    fn test_restore_with_corrupt_manifest() {
        let (dir, manager) = setup();
        fs::create_dir_all(dir.path().join(DIR)).unwrap();
        fs::write(dir.path().join(DIR).join(MANIFEST_FILE), "not json").unwrap();

        assert!(matches!(manager.restore(), Err(Error::Manifest { .. })));
        assert!(manager.info().is_none());
        assert!(matches!(manager.load_info(), Err(Error::Manifest { .. })));
    }

    #[test]
    fn test_restore_continues_past_missing_copy() {
        let (dir, manager) = setup();
        manager.backup_all(&["a.txt", "src/nested/b.rs"]).unwrap();
        fs::remove_file(dir.path().join(DIR).join("a.txt")).unwrap();
        fs::write(dir.path().join("src/nested/b.rs"), "edited").unwrap();

        let report = manager.restore().unwrap();
        assert_eq!(report.restored_count, 1);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "a.txt");
        assert_eq!(
            fs::read_to_string(dir.path().join("src/nested/b.rs")).unwrap(),
            "fn b() {}\r\n"
        );
    }

    #[test]
    fn test_info_and_has_backup_are_read_only() {
        let (dir, manager) = setup();
        manager.backup_all(&["a.txt"]).unwrap();
        let manifest_before = fs::read(dir.path().join(DIR).join(MANIFEST_FILE)).unwrap();

        for _ in 0..3 {
            assert!(manager.has_backup());
            assert!(manager.info().is_some());
        }

        let manifest_after = fs::read(dir.path().join(DIR).join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest_before, manifest_after);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "alpha\n");
    }

    #[test]
    fn test_cleanup() {
        let (dir, manager) = setup();
        assert!(!manager.cleanup().unwrap());

        manager.backup_all(&["a.txt"]).unwrap();
        assert!(manager.cleanup().unwrap());
        assert!(!dir.path().join(DIR).exists());
        assert!(!manager.has_backup());
    }

    #[test]
    fn test_validate_dir_name() {
        for name in [DIR, DEFAULT_NAME, "backups"] {
            assert!(validate_dir_name(name).is_ok(), "rejected {}", name);
        }
        let rejected = [
            "", " ", ".", "..", "../sibling", "/abs", "a/b", "a\\b", "nested/", ".git", ".GIT",
        ];
        for name in rejected {
            assert!(validate_dir_name(name).is_err(), "accepted {:?}", name);
        }
    }

    #[test]
    fn test_cleanup_never_leaves_repo() {
        let outer = TempDir::new().unwrap();
        let repo = outer.path().join("work");
        let sibling = outer.path().join("sibling");
        fs::create_dir_all(&repo).unwrap();
        fs::create_dir_all(&sibling).unwrap();
        fs::write(sibling.join("important.rs"), "keep me").unwrap();
        fs::write(repo.join("a.txt"), "alpha").unwrap();

        for name in ["../sibling", sibling.to_str().unwrap()] {
            let manager = BackupManager::new(&repo, name);
            assert!(!manager.has_backup());
            assert!(matches!(manager.cleanup(), Err(Error::Backup(_))));
            assert!(matches!(manager.restore(), Err(Error::Backup(_))));
            assert!(matches!(manager.backup_all(&["a.txt"]), Err(Error::Backup(_))));
        }

        assert_eq!(
            fs::read_to_string(sibling.join("important.rs")).unwrap(),
            "keep me"
        );
        assert!(!sibling.join("manifest.json").exists());
        assert!(!sibling.join("a.txt").exists());
    }

    #[test]
    fn test_managers_with_distinct_dirs_are_isolated() {
        let (dir, manager) = setup();
        let other = BackupManager::new(dir.path(), ".other-backup");

        manager.backup_all(&["a.txt"]).unwrap();
        assert!(manager.has_backup());
        assert!(!other.has_backup());
    }
}
