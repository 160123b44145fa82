//! Error kinds for the conflict resolution core.
//!
//! Core components return [`Result`]; the CLI layer wraps these in `anyhow`
//! with extra context. Batch operations (backup, restore, session) record
//! per-item failures instead of returning early, so only failures that are
//! fatal to a whole operation surface as `Err`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the parser, resolution engine, backup manager and session.
#[derive(Debug, Error)]
pub enum Error {
    /// A read/write/copy/mkdir/rm failed on a specific path.
    #[error("failed to {operation} '{}': {source}", path.display())]
    FileAccess {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No backup present, or the manifest could not be read.
    #[error("backup error: {0}")]
    Backup(String),

    /// The manifest exists but is not the expected structure.
    #[error("invalid backup manifest '{}': {detail}", path.display())]
    Manifest { path: PathBuf, detail: String },

    /// A resolution type outside the recognized set reached the splice step.
    #[error("unknown resolution type: {0}")]
    UnknownResolutionType(String),

    /// Configuration file could not be read or parsed.
    #[error("config error in '{}': {detail}", path.display())]
    Config { path: PathBuf, detail: String },

    /// The repository could not be inspected.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// The decision provider failed to produce an answer.
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl Error {
    /// Build a [`Error::FileAccess`] for `operation` on `path`.
    pub fn file_access(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::FileAccess {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}
