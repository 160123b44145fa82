//! Console reporting for sessions and backups

use chrono::Local;
use colored::Colorize;

use crate::backup::{BackupInfo, ItemFailure};
use crate::conflict::{ConflictStats, ParsedFile};
use crate::session::SessionResult;
use crate::utils::{center, plural, tree_prefix, BOX_WIDTH};

fn boxed_header(title: &str) -> String {
    let bar = "═".repeat(BOX_WIDTH);
    format!(
        "╔{}╗\n║{}║\n╚{}╝",
        bar,
        center(title, BOX_WIDTH).bold().white(),
        bar
    )
}

/// Statistics shown before resolution starts
pub fn format_conflict_stats(stats: &ConflictStats) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n\n", boxed_header("DETECTED MERGE CONFLICTS").cyan()));
    output.push_str("Statistics:\n");
    output.push_str(&format!(
        "   {} Files with conflicts: {}\n",
        "├─".dimmed(),
        stats.total_files.to_string().cyan()
    ));
    output.push_str(&format!(
        "   {} Total conflicts: {}\n",
        "├─".dimmed(),
        stats.total_conflicts.to_string().yellow()
    ));
    output.push_str(&format!(
        "   {} Simple conflicts: {} {}\n",
        "├─".dimmed(),
        stats.simple_conflicts.to_string().green(),
        "(can be auto-resolved)".dimmed()
    ));
    output.push_str(&format!(
        "   {} Complex conflicts: {}\n",
        "└─".dimmed(),
        stats.complex_conflicts.to_string().red()
    ));
    output
}

/// One line per conflicted file with its conflict count
pub fn format_conflicted_files(files: &[ParsedFile]) -> String {
    let mut output = format!("\n{}\n", "Conflicted files:".bold());
    for (index, file) in files.iter().enumerate() {
        let count = file.conflicts.len();
        output.push_str(&format!(
            "   {} {} {}\n",
            tree_prefix(index, files.len()).dimmed(),
            file.path,
            format!("({} {})", count, plural(count, "conflict", "conflicts")).dimmed()
        ));
    }
    output
}

/// End-of-session summary
pub fn format_summary(result: &SessionResult, backup_dir: Option<&str>) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n\n", boxed_header("MERGE RESOLUTION SUMMARY").blue()));

    output.push_str(&format!("{}\n", "Files:".bold()));
    output.push_str(&format!(
        "   {} Total processed: {}\n",
        "├─".dimmed(),
        result.files_processed.to_string().cyan()
    ));
    output.push_str(&format!(
        "   {} Successfully resolved: {}\n",
        "├─".dimmed(),
        result.files_resolved.to_string().green()
    ));
    let failed = if result.files_failed > 0 {
        result.files_failed.to_string().red()
    } else {
        result.files_failed.to_string().dimmed()
    };
    output.push_str(&format!("   {} Failed: {}\n", "└─".dimmed(), failed));

    output.push_str(&format!("\n{}\n", "Conflicts:".bold()));
    output.push_str(&format!(
        "   {} Total: {}\n",
        "├─".dimmed(),
        result.total_conflicts.to_string().cyan()
    ));
    output.push_str(&format!(
        "   {} Auto-resolved: {}\n",
        "├─".dimmed(),
        result.auto_resolved.to_string().green()
    ));
    output.push_str(&format!(
        "   {} Manually resolved: {}\n",
        "├─".dimmed(),
        result.manual_resolved.to_string().blue()
    ));
    output.push_str(&format!(
        "   {} Total resolved: {}\n",
        "├─".dimmed(),
        result.resolved().to_string().green().bold()
    ));
    if result.skipped > 0 {
        output.push_str(&format!(
            "   {} Remaining (skipped): {}\n",
            "└─".dimmed(),
            result.skipped.to_string().yellow()
        ));
    } else {
        output.push_str(&format!("   {} Remaining: {}\n", "└─".dimmed(), "0".green()));
    }

    if !result.failures.is_empty() {
        output.push_str(&format!("\n{}\n", "Failures:".bold().red()));
        output.push_str(&format_failures(&result.failures));
    }

    output.push_str(&format!("\n{}\n", "Status:".bold()));
    if result.skipped == 0 && result.files_resolved > 0 {
        output.push_str(&format!(
            "   {}\n",
            "All conflicts resolved successfully!".green().bold()
        ));
        output.push_str("\n   Next steps:\n");
        output.push_str(&format!("   1. Review the changes: {}\n", "git diff".cyan()));
        output.push_str(&format!("   2. Stage the resolved files: {}\n", "git add <files>".cyan()));
        output.push_str(&format!("   3. Complete the merge: {}\n", "git commit".cyan()));
    } else if result.skipped > 0 {
        output.push_str(&format!(
            "   {}\n",
            "Some conflicts remain unresolved".yellow().bold()
        ));
        output.push_str("\n   Next steps:\n");
        output.push_str(&format!(
            "   1. Run {} again to resolve remaining conflicts\n",
            "git-merge-helper".cyan()
        ));
        output.push_str("   2. Or resolve them manually in your editor\n");
    } else {
        output.push_str(&format!(
            "   {}\n",
            "No conflicts were resolved in this session".dimmed()
        ));
    }

    if let Some(dir) = backup_dir {
        output.push_str(&format!("\n{}\n", "Backup:".bold()));
        output.push_str(&format!(
            "   Original files backed up in: {}\n",
            format!("{}/", dir).cyan()
        ));
        output.push_str(&format!(
            "   Restore with: {}\n",
            "git-merge-helper rollback".cyan()
        ));
    }

    output
}

/// Tree listing of per-item failures
pub fn format_failures(failures: &[ItemFailure]) -> String {
    failures
        .iter()
        .enumerate()
        .map(|(index, failure)| {
            format!(
                "   {} {}: {}\n",
                tree_prefix(index, failures.len()).dimmed(),
                failure.path,
                failure.message.red()
            )
        })
        .collect()
}

/// Backup timestamp and file list
pub fn format_backup_info(info: &BackupInfo, list_files: bool) -> String {
    let mut output = format!(
        "Backup created: {}\nFiles in backup: {}\n",
        info.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .cyan(),
        info.file_count.to_string().cyan()
    );

    if list_files && !info.original_paths.is_empty() {
        output.push_str(&format!("\n{}\n", "Backed up files:".bold()));
        for (index, path) in info.original_paths.iter().enumerate() {
            output.push_str(&format!(
                "   {} {}\n",
                tree_prefix(index, info.original_paths.len()).dimmed(),
                path
            ));
        }
    }

    output
}

pub fn print_success(message: &str) {
    println!("\n{}\n", format!("✓ {}", message).green().bold());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", format!("ℹ {}", message).blue());
}

pub fn print_warning(message: &str) {
    println!("\n{}\n", format!("⚠ {}", message).yellow());
}
