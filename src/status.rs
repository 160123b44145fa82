//! Discovery of files left in a conflicted state

use std::path::{Path, PathBuf};

use git2::{Repository, StatusOptions};

use crate::error::{Error, Result};

/// Source of the paths that currently have unresolved conflicts
pub trait ConflictStatusProvider {
    /// Conflicted paths relative to `repo_root`, in a stable order
    fn conflicted_paths(&self, repo_root: &Path) -> Result<Vec<String>>;
}

/// Reads conflict state from the git index
#[derive(Debug, Default, Clone, Copy)]
pub struct GitStatusProvider;

impl ConflictStatusProvider for GitStatusProvider {
    fn conflicted_paths(&self, repo_root: &Path) -> Result<Vec<String>> {
        let repo = Repository::open(repo_root)?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = repo.statuses(Some(&mut opts))?;
        let mut paths: Vec<String> = statuses
            .iter()
            .filter(|entry| entry.status().is_conflicted())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect();
        paths.sort();
        paths.dedup();

        Ok(paths)
    }
}

/// Fixed list of paths, for callers that already know what is conflicted
#[derive(Debug, Default, Clone)]
pub struct StaticStatusProvider {
    paths: Vec<String>,
}

impl StaticStatusProvider {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConflictStatusProvider for StaticStatusProvider {
    fn conflicted_paths(&self, _repo_root: &Path) -> Result<Vec<String>> {
        Ok(self.paths.clone())
    }
}

/// Find the working directory of the repository containing `path`
pub fn discover_repo_root(path: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(path)?;
    let workdir = repo.workdir().ok_or_else(|| {
        Error::Git(git2::Error::from_str(
            "repository has no working directory (bare repository)",
        ))
    })?;
    Ok(workdir.to_path_buf())
}
