//! Conflict resolution session.
//!
//! Sequences discovery, parsing, classification, backup and per-conflict
//! resolution for one repository. Decisions come from a [`DecisionProvider`];
//! file-level failures are counted and the session moves on.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup::{BackupManager, BackupReport, ItemFailure};
use crate::config::DEFAULT_BACKUP_DIR;
use crate::conflict::{is_simple, preview, ConflictBlock, ConflictStats, ParsedFile};
use crate::error::{Error, Result};
use crate::resolve::{apply_all, Resolution, ResolutionType};
use crate::status::ConflictStatusProvider;

/// Everything a decision provider is told about one conflict
#[derive(Debug)]
pub struct DecisionRequest<'a> {
    /// Repository-relative file name
    pub file: &'a str,
    /// Zero-based index of the conflict within the file
    pub index: usize,
    /// Number of conflicts in the file
    pub total: usize,
    /// Whether [`ResolutionType::Auto`] may be offered
    pub is_simple: bool,
    pub conflict: &'a ConflictBlock,
    /// Rendered conflict for display
    pub preview: String,
}

/// Chooses how each conflict is resolved
pub trait DecisionProvider {
    /// Pick a resolution for one conflict. `Auto` should only be returned
    /// when `request.is_simple` is set.
    fn choose(&mut self, request: &DecisionRequest<'_>) -> Result<ResolutionType>;

    /// Asked once before anything is written. Returning `false` cancels the
    /// session with no changes made.
    fn confirm_session(&mut self, _files: &[ParsedFile], _stats: &ConflictStats) -> Result<bool> {
        Ok(true)
    }

    /// Called after backups were taken, before the first file is touched
    fn backup_finished(&mut self, _report: &BackupReport) {}

    /// Asked when some files could not be backed up. Returning `false` leaves
    /// those files untouched; they are reported as failed.
    fn resolve_without_backup(&mut self, _failures: &[ItemFailure]) -> Result<bool> {
        Ok(true)
    }

    /// Called before the first conflict of `file` is decided
    fn file_started(&mut self, _file: &ParsedFile) {}

    /// Called for conflicts resolved by the auto policy without asking
    fn auto_resolved(&mut self, _file: &ParsedFile, _index: usize) {}

    /// Called once per file with its tally, or the error that failed it
    fn file_finished(
        &mut self,
        _file: &ParsedFile,
        _outcome: std::result::Result<&FileTally, &Error>,
    ) {
    }
}

/// Applies the same strategy to every conflict without prompting
#[derive(Debug, Clone, Copy)]
pub struct FixedStrategy(pub ResolutionType);

impl DecisionProvider for FixedStrategy {
    fn choose(&mut self, request: &DecisionRequest<'_>) -> Result<ResolutionType> {
        // Auto on a complex conflict would silently keep both sides
        if self.0 == ResolutionType::Auto && !request.is_simple {
            return Ok(ResolutionType::Skip);
        }
        Ok(self.0)
    }
}

/// Session settings
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Resolve simple conflicts without asking
    pub auto_resolve: bool,
    /// Back up conflicted files before the first write
    pub create_backup: bool,
    /// Backup directory name under the repository root
    pub backup_dir: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            auto_resolve: false,
            create_backup: true,
            backup_dir: DEFAULT_BACKUP_DIR.to_string(),
        }
    }
}

/// Counters reported at the end of a session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionResult {
    pub files_processed: usize,
    pub files_resolved: usize,
    pub files_failed: usize,
    pub total_conflicts: usize,
    pub auto_resolved: usize,
    pub manual_resolved: usize,
    pub skipped: usize,
    /// Per-file failure messages
    pub failures: Vec<ItemFailure>,
}

impl SessionResult {
    /// Conflicts resolved either automatically or by choice
    pub fn resolved(&self) -> usize {
        self.auto_resolved + self.manual_resolved
    }
}

/// Per-file tally produced by [`Session::resolve_file`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTally {
    pub auto_resolved: usize,
    pub manual_resolved: usize,
    pub skipped: usize,
}

impl FileTally {
    fn record(&mut self, kind: ResolutionType) {
        match kind {
            ResolutionType::Skip => self.skipped += 1,
            ResolutionType::Auto => self.auto_resolved += 1,
            _ => self.manual_resolved += 1,
        }
    }

    /// Whether any conflict in the file will be rewritten
    pub fn changes_file(&self) -> bool {
        self.auto_resolved > 0 || self.manual_resolved > 0
    }
}

/// How a [`Session::run`] ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// The status provider reported nothing, or no file held markers
    NoConflicts,
    /// The decision provider declined to start
    Cancelled,
    Completed {
        result: SessionResult,
        /// `None` when backups were disabled
        backup: Option<BackupReport>,
    },
}

/// A resolution session against one repository
pub struct Session {
    repo_root: PathBuf,
    options: SessionOptions,
}

impl Session {
    pub fn new(repo_root: impl Into<PathBuf>, options: SessionOptions) -> Self {
        Self {
            repo_root: repo_root.into(),
            options,
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Backup manager for this session's repository
    pub fn backup_manager(&self) -> BackupManager {
        BackupManager::new(&self.repo_root, self.options.backup_dir.clone())
    }

    /// Parse every conflicted file. Unreadable files are logged and skipped,
    /// files without complete marker blocks are dropped.
    pub fn scan(&self, status: &dyn ConflictStatusProvider) -> Result<Vec<ParsedFile>> {
        let paths = status.conflicted_paths(&self.repo_root)?;
        debug!(count = paths.len(), "conflicted paths reported");

        let mut files = Vec::new();
        for path in paths {
            match ParsedFile::parse_file(&self.repo_root, &path) {
                Ok(parsed) if parsed.has_conflicts() => files.push(parsed),
                Ok(_) => debug!(path = %path, "no conflict markers found"),
                Err(e) => warn!(path = %path, error = %e, "skipping unreadable file"),
            }
        }

        Ok(files)
    }

    /// Full session: scan, confirm, back up, resolve and write.
    pub fn run(
        &self,
        status: &dyn ConflictStatusProvider,
        decider: &mut dyn DecisionProvider,
    ) -> Result<SessionOutcome> {
        let files = self.scan(status)?;
        if files.is_empty() {
            return Ok(SessionOutcome::NoConflicts);
        }

        let stats = ConflictStats::collect(&files);
        info!(
            files = stats.total_files,
            conflicts = stats.total_conflicts,
            simple = stats.simple_conflicts,
            "conflicts detected"
        );

        if !decider.confirm_session(&files, &stats)? {
            info!("session cancelled before any change");
            return Ok(SessionOutcome::Cancelled);
        }

        let mut unbacked = Vec::new();
        let backup = if self.options.create_backup {
            let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
            let report = self.backup_manager().backup_all(&paths)?;
            decider.backup_finished(&report);
            if !report.failures.is_empty()
                && !decider.resolve_without_backup(&report.failures)?
            {
                unbacked = report.failures.clone();
            }
            Some(report)
        } else {
            None
        };

        let files: Vec<ParsedFile> = files
            .into_iter()
            .filter(|f| !unbacked.iter().any(|u| u.path == f.path))
            .collect();
        let mut result = self.resolve_all(&files, decider);

        for failure in unbacked {
            warn!(path = %failure.path, "left unchanged, no backup");
            result.files_failed += 1;
            result.failures.push(ItemFailure {
                message: format!("left unchanged, backup failed: {}", failure.message),
                path: failure.path,
            });
        }

        Ok(SessionOutcome::Completed { result, backup })
    }

    /// Resolve and write each file in turn
    pub fn resolve_all(
        &self,
        files: &[ParsedFile],
        decider: &mut dyn DecisionProvider,
    ) -> SessionResult {
        let mut result = SessionResult::default();

        for file in files {
            result.files_processed += 1;
            result.total_conflicts += file.conflicts.len();

            decider.file_started(file);
            let outcome = self.resolve_file(file, decider);
            decider.file_finished(file, outcome.as_ref());

            match outcome {
                Ok(tally) => {
                    result.auto_resolved += tally.auto_resolved;
                    result.manual_resolved += tally.manual_resolved;
                    result.skipped += tally.skipped;
                    if tally.changes_file() {
                        result.files_resolved += 1;
                    }
                }
                Err(e) => {
                    warn!(path = %file.path, error = %e, "failed to resolve file");
                    result.files_failed += 1;
                    result.failures.push(ItemFailure {
                        path: file.path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        result
    }

    /// Collect a decision for every conflict in `file`, then rewrite it if
    /// anything other than skips was chosen.
    pub fn resolve_file(
        &self,
        file: &ParsedFile,
        decider: &mut dyn DecisionProvider,
    ) -> Result<FileTally> {
        let mut tally = FileTally::default();
        let mut resolutions = Vec::with_capacity(file.conflicts.len());
        let total = file.conflicts.len();

        for (index, conflict) in file.conflicts.iter().enumerate() {
            let simple = is_simple(conflict);

            let kind = if self.options.auto_resolve && simple {
                debug!(path = %file.path, conflict = index + 1, "auto-resolved simple conflict");
                decider.auto_resolved(file, index);
                ResolutionType::Auto
            } else {
                let request = DecisionRequest {
                    file: &file.path,
                    index,
                    total,
                    is_simple: simple,
                    conflict,
                    preview: preview::render(conflict, index),
                };
                decider.choose(&request)?
            };

            tally.record(kind);
            resolutions.push(Resolution::new(conflict, kind));
        }

        if tally.changes_file() {
            let content = apply_all(file, &resolutions)?;
            let target = self.repo_root.join(&file.path);
            fs::write(&target, content).map_err(|e| Error::file_access("write", &target, e))?;
            info!(path = %file.path, "resolved file written");
        } else {
            info!(path = %file.path, "all conflicts skipped");
        }

        Ok(tally)
    }
}
