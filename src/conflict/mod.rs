//! Conflict marker parsing, classification and preview rendering

pub mod classify;
pub mod parser;
pub mod preview;

pub use classify::{is_blank_side, is_simple, ConflictStats};
pub use parser::{ConflictBlock, ParsedFile};
