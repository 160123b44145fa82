pub mod backup;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod error;
pub mod resolve;
pub mod session;
pub mod status;
pub mod utils;

pub use backup::{BackupInfo, BackupManager, RestoreReport};
pub use config::HelperConfig;
pub use conflict::{ConflictBlock, ConflictStats, ParsedFile};
pub use error::{Error, Result};
pub use resolve::{apply_all, resolve, Resolution, ResolutionType};
pub use session::{
    DecisionProvider, FixedStrategy, Session, SessionOptions, SessionOutcome, SessionResult,
};
pub use status::{ConflictStatusProvider, GitStatusProvider};
