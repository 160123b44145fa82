//! Configuration for git-merge-helper
//!
//! Supports loading from `.git-merge-helper.toml` (repo) or
//! `~/.config/git-merge-helper/config.toml` (global).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backup::validate_dir_name;
use crate::error::{Error, Result};
use crate::resolve::ResolutionType;

/// Repo-local config file name
const REPO_CONFIG_FILE: &str = ".git-merge-helper.toml";

/// Default name of the backup directory under the repository root
pub const DEFAULT_BACKUP_DIR: &str = ".git-merge-helper-backup";

/// Full configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HelperConfig {
    /// Backup settings
    pub backup: BackupConfig,

    /// Resolution settings
    pub resolve: ResolveConfig,
}

/// Backup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Whether to back up conflicted files before resolving
    pub enabled: bool,

    /// Backup directory name, relative to the repository root
    pub dir_name: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir_name: DEFAULT_BACKUP_DIR.to_string(),
        }
    }
}

/// Resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResolveConfig {
    /// Auto-resolve simple conflicts without prompting
    pub auto_resolve: bool,

    /// Strategy applied to every prompted conflict instead of asking
    /// (e.g. "incoming"). Unset means interactive.
    pub default_strategy: Option<String>,
}

impl ResolveConfig {
    /// Parse the configured default strategy, if any
    pub fn strategy(&self) -> Result<Option<ResolutionType>> {
        self.default_strategy
            .as_deref()
            .map(str::parse)
            .transpose()
    }
}

impl HelperConfig {
    /// Load configuration from repo root, falling back to global config
    pub fn load(repo_root: &Path) -> Result<Self> {
        let repo_config = Self::repo_config_path(repo_root);
        if repo_config.exists() {
            return Self::load_from_file(&repo_config);
        }

        if let Some(global_config) = Self::global_config_path() {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::file_access("read", path, e))?;

        let config: Self = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        validate_dir_name(&config.backup.dir_name).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            detail: format!("backup.dir_name: {e}"),
        })?;

        Ok(config)
    }

    /// Get global config path (~/.config/git-merge-helper/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        config_dir().map(|p| p.join("config.toml"))
    }

    /// Get repo-local config path
    pub fn repo_config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(REPO_CONFIG_FILE)
    }
}

/// Get the git-merge-helper config directory
fn config_dir() -> Option<PathBuf> {
    // XDG_CONFIG_HOME wins over the platform default
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|p| p.join("git-merge-helper"))
}
