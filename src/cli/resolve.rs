use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::output::{format_summary, print_info, print_success};
use crate::cli::prompt::TerminalDecider;
use crate::config::HelperConfig;
use crate::resolve::ResolutionType;
use crate::session::{Session, SessionOptions, SessionOutcome};
use crate::status::GitStatusProvider;

/// Resolve command arguments
#[derive(Debug, Clone, Default, Args)]
pub struct ResolveArgs {
    /// Auto-resolve simple conflicts without asking
    #[arg(short, long)]
    pub auto: bool,

    /// Skip creating backups (not recommended)
    #[arg(long)]
    pub no_backup: bool,

    /// Resolve every prompted conflict with this strategy instead of asking
    #[arg(long, value_enum)]
    pub strategy: Option<ResolutionType>,

    /// Start without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Output the session summary as JSON (requires --strategy and --yes)
    #[arg(long, requires = "strategy")]
    pub json: bool,
}

impl ResolveArgs {
    /// Whether any flag differs from its default
    pub fn any_set(&self) -> bool {
        self.auto || self.no_backup || self.strategy.is_some() || self.yes || self.json
    }
}

/// Run the resolve command
pub fn run(repo_root: &Path, config: &HelperConfig, args: ResolveArgs) -> Result<()> {
    if args.json && !args.yes {
        bail!("--json cannot prompt for confirmation; add --yes");
    }

    let strategy = match args.strategy {
        Some(strategy) => Some(strategy),
        None => config.resolve.strategy()?,
    };

    let options = SessionOptions {
        auto_resolve: args.auto || config.resolve.auto_resolve,
        create_backup: !args.no_backup && config.backup.enabled,
        backup_dir: config.backup.dir_name.clone(),
    };

    let mut decider = TerminalDecider::new(strategy, args.yes, args.json);
    if decider.needs_terminal() && !atty::is(atty::Stream::Stdin) {
        bail!("Interactive resolution needs a terminal; pass --strategy and --yes to run unattended");
    }

    if !args.json {
        println!("\n{}\n", "Git Merge Helper".bold().cyan());
        println!("{}", "Scanning for conflicts...".dimmed());
    }

    let create_backup = options.create_backup;
    let session = Session::new(repo_root, options);
    let outcome = session.run(&GitStatusProvider, &mut decider)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&session, &outcome))?);
        return Ok(());
    }

    match outcome {
        SessionOutcome::NoConflicts => print_success("No merge conflicts detected!"),
        SessionOutcome::Cancelled => print_info("Operation cancelled by user"),
        SessionOutcome::Completed { result, .. } => {
            let backup_dir = create_backup.then(|| session.options().backup_dir.as_str());
            print!("{}", format_summary(&result, backup_dir));
        }
    }

    Ok(())
}

fn outcome_json(session: &Session, outcome: &SessionOutcome) -> serde_json::Value {
    match outcome {
        SessionOutcome::NoConflicts => serde_json::json!({ "outcome": "no_conflicts" }),
        SessionOutcome::Cancelled => serde_json::json!({ "outcome": "cancelled" }),
        SessionOutcome::Completed { result, backup } => serde_json::json!({
            "outcome": "completed",
            "result": result,
            "backup": backup.as_ref().map(|report| serde_json::json!({
                "dir": session.options().backup_dir,
                "files": report.entries.len(),
                "failures": report.failures,
            })),
        }),
    }
}
