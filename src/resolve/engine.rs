use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::{is_blank_side, ConflictBlock, ParsedFile};
use crate::error::{Error, Result};

/// Strategy chosen for a single conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionType {
    /// Keep the current branch's side
    #[value(name = "head")]
    KeepHead,
    /// Keep the merged branch's side
    #[value(name = "incoming")]
    KeepIncoming,
    /// Keep head followed by incoming
    #[value(name = "both")]
    KeepBoth,
    /// Keep whichever side is not blank
    Auto,
    /// Leave the conflict in place
    Skip,
}

impl ResolutionType {
    /// Short name used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepHead => "head",
            Self::KeepIncoming => "incoming",
            Self::KeepBoth => "both",
            Self::Auto => "auto",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ResolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" | "ours" => Ok(Self::KeepHead),
            "incoming" | "theirs" => Ok(Self::KeepIncoming),
            "both" => Ok(Self::KeepBoth),
            "auto" => Ok(Self::Auto),
            "skip" => Ok(Self::Skip),
            _ => Err(Error::UnknownResolutionType(s.to_string())),
        }
    }
}

/// Outcome for one conflict: the chosen type and the text replacing the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub kind: ResolutionType,
    /// `None` leaves the block untouched
    pub content: Option<String>,
}

impl Resolution {
    /// Resolve `conflict` with `kind`
    pub fn new(conflict: &ConflictBlock, kind: ResolutionType) -> Self {
        Self {
            kind,
            content: resolve(conflict, kind),
        }
    }

    /// A resolution that leaves the block in place
    pub fn skip() -> Self {
        Self {
            kind: ResolutionType::Skip,
            content: None,
        }
    }
}

/// Replacement text for `conflict` under `kind`, `None` for [`ResolutionType::Skip`]
pub fn resolve(conflict: &ConflictBlock, kind: ResolutionType) -> Option<String> {
    let head = &conflict.head_lines;
    let incoming = &conflict.incoming_lines;

    match kind {
        ResolutionType::KeepHead => Some(head.join("\n")),
        ResolutionType::KeepIncoming => Some(incoming.join("\n")),
        ResolutionType::KeepBoth => Some(keep_both(head, incoming)),
        ResolutionType::Auto => {
            if is_blank_side(head) {
                Some(incoming.join("\n"))
            } else if is_blank_side(incoming) {
                Some(head.join("\n"))
            } else {
                Some(keep_both(head, incoming))
            }
        }
        ResolutionType::Skip => None,
    }
}

fn keep_both(head: &[String], incoming: &[String]) -> String {
    head.iter()
        .chain(incoming.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splice `resolutions` into the file and return the new text.
///
/// `resolutions[i]` belongs to `file.conflicts[i]`; a missing tail is treated
/// as skipped. Conflicts are applied in ascending order, each window shifted
/// by the net line change of the replacements before it.
pub fn apply_all(file: &ParsedFile, resolutions: &[Resolution]) -> Result<String> {
    let mut lines = file.lines.clone();
    let mut offset: isize = 0;

    for (conflict, resolution) in file.conflicts.iter().zip(resolutions) {
        let content = match (resolution.kind, &resolution.content) {
            (ResolutionType::Skip, _) => continue,
            (_, Some(content)) => content,
            (kind, None) => return Err(Error::UnknownResolutionType(kind.to_string())),
        };

        let start = shift(conflict.start_line - 1, offset);
        let end = shift(conflict.end_line, offset);
        let replacement: Vec<String> = if content.is_empty() {
            Vec::new()
        } else {
            content.split('\n').map(str::to_string).collect()
        };

        let window_len = end - start;
        let replacement_len = replacement.len();
        lines.splice(start..end, replacement);
        offset += window_len as isize - replacement_len as isize;

        debug!(
            path = %file.path,
            start_line = conflict.start_line,
            kind = %resolution.kind,
            removed = window_len,
            inserted = replacement_len,
            "applied resolution"
        );
    }

    Ok(lines.join("\n"))
}

fn shift(line_index: usize, offset: isize) -> usize {
    (line_index as isize - offset) as usize
}
