//! Terminal prompts: the interactive decision provider and confirmations

use colored::Colorize;
use dialoguer::{Confirm, Select};

use crate::backup::{BackupReport, ItemFailure};
use crate::cli::output::{format_conflict_stats, format_conflicted_files, format_failures};
use crate::conflict::{ConflictStats, ParsedFile};
use crate::error::{Error, Result};
use crate::resolve::ResolutionType;
use crate::session::{DecisionProvider, DecisionRequest, FileTally, FixedStrategy};
use crate::utils::SEPARATOR_WIDTH;

/// Ask a yes/no question on the terminal
pub fn confirm(question: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(question)
        .default(default)
        .interact()
        .map_err(|e| Error::Prompt(format!("failed to read confirmation: {e}")))
}

/// Choices offered for a conflict, in menu order
fn choices(is_simple: bool) -> Vec<ResolutionType> {
    let mut options = Vec::with_capacity(5);
    if is_simple {
        options.push(ResolutionType::Auto);
    }
    options.extend([
        ResolutionType::KeepHead,
        ResolutionType::KeepIncoming,
        ResolutionType::KeepBoth,
        ResolutionType::Skip,
    ]);
    options
}

fn choice_label(kind: ResolutionType) -> String {
    match kind {
        ResolutionType::Auto => format!(
            "{} (recommended for simple conflicts)",
            "Auto-resolve".blue()
        ),
        ResolutionType::KeepHead => format!("{} (current branch)", "Keep HEAD".green()),
        ResolutionType::KeepIncoming => format!("{} (merge branch)", "Keep Incoming".cyan()),
        ResolutionType::KeepBoth => format!("{} (HEAD + Incoming)", "Keep Both".yellow()),
        ResolutionType::Skip => format!("{} (resolve later)", "Skip".dimmed()),
    }
}

/// Decision provider for the command line.
///
/// Prompts with a menu per conflict, or applies a fixed strategy when one
/// was given. Progress is printed to stdout unless `quiet` is set.
pub struct TerminalDecider {
    strategy: Option<FixedStrategy>,
    assume_yes: bool,
    quiet: bool,
}

impl TerminalDecider {
    pub fn new(strategy: Option<ResolutionType>, assume_yes: bool, quiet: bool) -> Self {
        Self {
            strategy: strategy.map(FixedStrategy),
            assume_yes,
            quiet,
        }
    }

    /// Whether this provider will need to read from the terminal
    pub fn needs_terminal(&self) -> bool {
        self.strategy.is_none() || !self.assume_yes
    }
}

impl DecisionProvider for TerminalDecider {
    fn choose(&mut self, request: &DecisionRequest<'_>) -> Result<ResolutionType> {
        if let Some(fixed) = self.strategy.as_mut() {
            let kind = fixed.choose(request)?;
            if !self.quiet {
                println!(
                    "  {} conflict {}/{}: {}",
                    request.file,
                    request.index + 1,
                    request.total,
                    kind.to_string().cyan()
                );
            }
            return Ok(kind);
        }

        println!("\n{} {}", "File:".bold(), request.file);
        println!("{}", request.preview);

        let options = choices(request.is_simple);
        let labels: Vec<String> = options.iter().map(|o| choice_label(*o)).collect();

        let selection = Select::new()
            .with_prompt(format!(
                "How would you like to resolve this conflict? ({}/{})",
                request.index + 1,
                request.total
            ))
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| Error::Prompt(format!("failed to read choice: {e}")))?;

        Ok(options[selection])
    }

    fn confirm_session(&mut self, files: &[ParsedFile], stats: &ConflictStats) -> Result<bool> {
        if !self.quiet {
            print!("{}", format_conflict_stats(stats));
            println!("{}", format_conflicted_files(files));
        }

        if self.assume_yes {
            return Ok(true);
        }
        confirm("Would you like to start resolving conflicts?", true)
    }

    fn backup_finished(&mut self, report: &BackupReport) {
        if self.quiet {
            return;
        }
        println!(
            "{} {} {}",
            "Backed up".green(),
            report.entries.len(),
            crate::utils::plural(report.entries.len(), "file", "files")
        );
        if !report.failures.is_empty() {
            println!("{}", "Some files could not be backed up:".yellow());
            print!("{}", format_failures(&report.failures));
        }
    }

    fn resolve_without_backup(&mut self, _failures: &[ItemFailure]) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        confirm("Resolve the files that have no backup anyway?", false)
    }

    fn file_started(&mut self, file: &ParsedFile) {
        if self.quiet {
            return;
        }
        let bar = "═".repeat(SEPARATOR_WIDTH);
        println!("\n{}", bar.blue().bold());
        println!("  {} {}", "Resolving:".bold(), file.path);
        println!("{}", bar.blue().bold());
    }

    fn auto_resolved(&mut self, _file: &ParsedFile, index: usize) {
        if !self.quiet {
            println!(
                "{}",
                format!("✓ Auto-resolved conflict #{} (simple conflict)", index + 1).green()
            );
        }
    }

    fn file_finished(
        &mut self,
        file: &ParsedFile,
        outcome: std::result::Result<&FileTally, &Error>,
    ) {
        if self.quiet {
            return;
        }
        match outcome {
            Ok(tally) if tally.changes_file() => {
                println!("{}", format!("✓ File saved: {}", file.path).green().bold());
            }
            Ok(_) => {
                println!("{}", format!("⚠ All conflicts skipped in: {}", file.path).yellow());
            }
            Err(e) => {
                println!("{}", format!("✗ Error resolving {}: {}", file.path, e).red());
            }
        }
    }
}
