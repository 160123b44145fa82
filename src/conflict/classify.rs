use serde::Serialize;

use super::parser::{ConflictBlock, ParsedFile};

/// True if the side has no lines or only whitespace lines
pub fn is_blank_side(lines: &[String]) -> bool {
    lines.iter().all(|line| line.trim().is_empty())
}

/// A conflict is simple when either side is a pure deletion,
/// which makes it safe to auto-resolve.
pub fn is_simple(conflict: &ConflictBlock) -> bool {
    is_blank_side(&conflict.head_lines) || is_blank_side(&conflict.incoming_lines)
}

/// Aggregate conflict statistics over a set of parsed files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConflictStats {
    pub total_files: usize,
    pub total_conflicts: usize,
    pub simple_conflicts: usize,
    pub complex_conflicts: usize,
}

impl ConflictStats {
    /// Collect statistics for `files`
    pub fn collect(files: &[ParsedFile]) -> Self {
        let conflicts = files.iter().flat_map(|f| f.conflicts.iter());

        let (total_conflicts, simple_conflicts) =
            conflicts.fold((0, 0), |(total, simple), c| {
                (total + 1, simple + usize::from(is_simple(c)))
            });

        Self {
            total_files: files.len(),
            total_conflicts,
            simple_conflicts,
            complex_conflicts: total_conflicts - simple_conflicts,
        }
    }
}
