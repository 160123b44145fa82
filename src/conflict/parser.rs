use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Line prefix opening a conflict (head side follows)
pub const START_MARKER: &str = "<<<<<<<";
/// Line prefix separating head from incoming
pub const MIDDLE_MARKER: &str = "=======";
/// Line prefix closing a conflict
pub const END_MARKER: &str = ">>>>>>>";

/// One marker-delimited conflict region within a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictBlock {
    /// 1-indexed line of the start marker
    pub start_line: usize,
    /// 1-indexed line of the middle marker
    pub middle_line: usize,
    /// 1-indexed line of the end marker
    pub end_line: usize,
    /// Text after the start marker (usually "HEAD"), trimmed
    pub head_label: String,
    /// Text after the end marker (usually the merged branch), trimmed
    pub incoming_label: String,
    /// Raw lines between start and middle markers
    pub head_lines: Vec<String>,
    /// Raw lines between middle and end markers
    pub incoming_lines: Vec<String>,
}

impl ConflictBlock {
    /// Number of lines the block spans, markers included
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// A file under resolution
#[derive(Debug, Clone, Serialize)]
pub struct ParsedFile {
    /// Path relative to the repository root
    pub path: String,
    /// Content as read from disk
    #[serde(skip)]
    pub raw_content: String,
    /// `raw_content` split on `\n`; joining with `\n` gives `raw_content` back
    #[serde(skip)]
    pub lines: Vec<String>,
    /// Conflicts in ascending, non-overlapping order
    pub conflicts: Vec<ConflictBlock>,
}

impl ParsedFile {
    /// Parse `text` for conflict markers. Never fails.
    pub fn parse(path: impl Into<String>, text: &str) -> Self {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let conflicts = scan(&lines);

        Self {
            path: path.into(),
            raw_content: text.to_string(),
            lines,
            conflicts,
        }
    }

    /// Read `relative_path` under `repo_root` and parse it
    pub fn parse_file(repo_root: &Path, relative_path: &str) -> Result<Self> {
        let full_path = repo_root.join(relative_path);
        let content =
            fs::read_to_string(&full_path).map_err(|e| Error::file_access("read", &full_path, e))?;

        let parsed = Self::parse(relative_path, &content);
        debug!(
            path = relative_path,
            conflicts = parsed.conflicts.len(),
            "parsed conflicted file"
        );
        Ok(parsed)
    }

    /// Whether any complete conflict block was found
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Conflict under construction while the scanner is inside a block
#[derive(Debug)]
struct OpenConflict {
    start_line: usize,
    middle_line: usize,
    head_label: String,
    head_lines: Vec<String>,
    incoming_lines: Vec<String>,
}

/// Scanner state. A start marker in any state opens a fresh conflict,
/// dropping whatever was still open.
#[derive(Debug)]
enum ScanState {
    Scanning,
    InHead(OpenConflict),
    InIncoming(OpenConflict),
}

fn marker_suffix(line: &str, marker: &str) -> String {
    line[marker.len()..].trim().to_string()
}

/// Single linear pass over `lines` collecting closed conflict blocks
fn scan(lines: &[String]) -> Vec<ConflictBlock> {
    let mut conflicts = Vec::new();
    let mut state = ScanState::Scanning;

    for (idx, line) in lines.iter().enumerate() {
        let line_number = idx + 1;

        if line.starts_with(START_MARKER) {
            if !matches!(state, ScanState::Scanning) {
                debug!(line = line_number, "start marker inside open conflict, restarting");
            }
            state = ScanState::InHead(OpenConflict {
                start_line: line_number,
                middle_line: 0,
                head_label: marker_suffix(line, START_MARKER),
                head_lines: Vec::new(),
                incoming_lines: Vec::new(),
            });
            continue;
        }

        state = match state {
            ScanState::Scanning => ScanState::Scanning,
            ScanState::InHead(mut open) => {
                if line.starts_with(MIDDLE_MARKER) {
                    open.middle_line = line_number;
                    ScanState::InIncoming(open)
                } else if line.starts_with(END_MARKER) {
                    debug!(line = line_number, "end marker before middle marker, ignoring");
                    ScanState::InHead(open)
                } else {
                    open.head_lines.push(line.clone());
                    ScanState::InHead(open)
                }
            }
            ScanState::InIncoming(mut open) => {
                if line.starts_with(END_MARKER) {
                    conflicts.push(ConflictBlock {
                        start_line: open.start_line,
                        middle_line: open.middle_line,
                        end_line: line_number,
                        head_label: open.head_label,
                        incoming_label: marker_suffix(line, END_MARKER),
                        head_lines: open.head_lines,
                        incoming_lines: open.incoming_lines,
                    });
                    ScanState::Scanning
                } else if line.starts_with(MIDDLE_MARKER) {
                    // Repeated middle marker: the separator moves, incoming lines stay
                    open.middle_line = line_number;
                    ScanState::InIncoming(open)
                } else {
                    open.incoming_lines.push(line.clone());
                    ScanState::InIncoming(open)
                }
            }
        };
    }

    if let ScanState::InHead(open) | ScanState::InIncoming(open) = state {
        debug!(start = open.start_line, "discarding unclosed conflict at end of input");
    }

    conflicts
}
