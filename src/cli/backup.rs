use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::backup::BackupManager;
use crate::cli::output::{format_backup_info, format_failures, print_info, print_success, print_warning};
use crate::cli::prompt::confirm;

/// Rollback command arguments
#[derive(Debug, Args)]
pub struct RollbackArgs {
    /// Restore without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Backup-info command arguments
#[derive(Debug, Args)]
pub struct BackupInfoArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Clean-backup command arguments
#[derive(Debug, Args)]
pub struct CleanBackupArgs {
    /// Remove without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Restore every file from the last backup
pub fn run_rollback(manager: &BackupManager, args: RollbackArgs) -> Result<()> {
    if !manager.has_backup() {
        print_warning("No backup found to restore");
        return Ok(());
    }
    let info = manager.load_info()?;

    println!("\n{}\n", "Rollback".bold().yellow());
    print!("{}", format_backup_info(&info, false));

    if !args.yes
        && !confirm(
            "Are you sure you want to restore all files from backup?",
            false,
        )?
    {
        print_info("Rollback cancelled");
        return Ok(());
    }

    let report = manager.restore()?;
    print_success(&format!(
        "Restored {}/{} files from backup",
        report.restored_count, report.total_files
    ));

    if !report.failures.is_empty() {
        println!("{}", "Some files could not be restored:".red());
        print!("{}", format_failures(&report.failures));
    }

    if !args.yes && confirm("Delete backup files?", false)? {
        manager.cleanup()?;
        print_success("Backup cleaned up");
    }

    Ok(())
}

/// Show the current backup, if any
pub fn run_backup_info(manager: &BackupManager, args: BackupInfoArgs) -> Result<()> {
    let info = manager.info();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    match info {
        Some(info) => {
            println!("\n{}\n", "Backup Information".bold().cyan());
            print!("{}", format_backup_info(&info, true));
            println!();
        }
        None => print_info("No backup found"),
    }

    Ok(())
}

/// Delete the backup directory
pub fn run_clean_backup(manager: &BackupManager, args: CleanBackupArgs) -> Result<()> {
    if !manager.has_backup() {
        print_info("No backup to clean up");
        return Ok(());
    }

    if !args.yes && !confirm("Delete all backup files?", false)? {
        print_info("Cleanup cancelled");
        return Ok(());
    }

    manager.cleanup()?;
    print_success("Backup cleaned up");
    Ok(())
}
