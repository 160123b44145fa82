use colored::Colorize;

use super::parser::ConflictBlock;
use crate::utils::SEPARATOR_WIDTH;

/// Render a conflict for display in a prompt.
///
/// `index` is zero-based; the header shows it one-based.
pub fn render(conflict: &ConflictBlock, index: usize) -> String {
    let separator = "─".repeat(SEPARATOR_WIDTH).dimmed().to_string();
    let head_label = non_empty(&conflict.head_label, "current branch");
    let incoming_label = non_empty(&conflict.incoming_label, "incoming branch");

    let mut output = String::new();
    output.push_str(&format!("{}\n", separator));
    output.push_str(&format!(
        "{} {}\n",
        format!("Conflict #{}", index + 1).bold().blue(),
        format!("(lines {}-{})", conflict.start_line, conflict.end_line).dimmed()
    ));
    output.push_str(&format!("{}\n\n", separator));

    output.push_str(&format!(
        "{} {}\n",
        "<<<<<<< HEAD".green(),
        format!("({})", head_label).dimmed()
    ));
    output.push_str(&format!("{}\n\n", side_text(&conflict.head_lines).green()));
    output.push_str(&format!("{}\n\n", "=======".yellow()));
    output.push_str(&format!("{}\n", side_text(&conflict.incoming_lines).cyan()));
    output.push_str(&format!(
        "{}\n",
        format!(">>>>>>> {}", incoming_label).cyan()
    ));
    output.push_str(&format!("{}\n", separator));

    output
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn side_text(lines: &[String]) -> String {
    let joined = lines.join("\n");
    if joined.is_empty() {
        "(empty)".to_string()
    } else {
        joined
    }
}
