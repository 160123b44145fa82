pub mod backup;
pub mod output;
pub mod prompt;
pub mod resolve;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::backup::BackupManager;
use crate::config::HelperConfig;
use crate::status::discover_repo_root;

/// Interactive helper for resolving git merge conflicts
#[derive(Debug, Parser)]
#[command(name = "git-merge-helper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub resolve: resolve::ResolveArgs,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "repo", global = true, default_value = ".")]
    pub repo: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve merge conflicts (the default when no command is given)
    Resolve(resolve::ResolveArgs),

    /// Restore all files from the last backup
    Rollback(backup::RollbackArgs),

    /// Show information about the current backup
    BackupInfo(backup::BackupInfoArgs),

    /// Delete the backup directory
    CleanBackup(backup::CleanBackupArgs),
}

impl Cli {
    /// Resolve flags given before a subcommand would be silently dropped
    fn check_flags(&self) -> Result<()> {
        if self.command.is_some() && self.resolve.any_set() {
            bail!(
                "Resolve options must follow the 'resolve' command, or be used without a command"
            );
        }
        Ok(())
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.check_flags()?;

    let repo_root = discover_repo_root(&cli.repo).context("Not in a git repository")?;
    let config = match HelperConfig::load(&repo_root) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "ignoring invalid configuration, using defaults");
            HelperConfig::default()
        }
    };
    let manager = BackupManager::new(&repo_root, config.backup.dir_name.clone());

    match cli.command {
        None => resolve::run(&repo_root, &config, cli.resolve),
        Some(Commands::Resolve(args)) => resolve::run(&repo_root, &config, args),
        Some(Commands::Rollback(args)) => backup::run_rollback(&manager, args),
        Some(Commands::BackupInfo(args)) => backup::run_backup_info(&manager, args),
        Some(Commands::CleanBackup(args)) => backup::run_clean_backup(&manager, args),
    }
}
