//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::actions::DEFAULT_AGE_DAYS;

/// muster - manage a fleet of local Git repositories
#[derive(Parser, Debug)]
#[command(name = "muster")]
#[command(version, about = "Manage local Git repositories", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.muster.toml, then ~/muster.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Select a project by name (repeatable)
    #[arg(long = "project", global = true, value_name = "PROJECT")]
    pub projects: Vec<String>,

    /// Select projects under the indicated folder (repeatable)
    #[arg(long = "project-dir", global = true, value_name = "DIR")]
    pub project_dirs: Vec<String>,

    /// Select projects with this active branch
    #[arg(long = "active-branch", global = true, value_name = "BRANCH")]
    pub active_branch: Option<String>,

    /// Select projects with this mark
    #[arg(long, global = true, value_name = "MARK")]
    pub mark: Option<String>,

    /// Log level
    #[arg(
        long,
        global = true,
        default_value = "info",
        value_parser = ["debug", "info", "warn", "error"],
    )]
    pub level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sync all projects (fast-forward pull)
    Sync,

    /// Local repository report (no network interaction)
    Report,

    /// Retire unused branches
    Cleanup,

    /// Generate a merged-branches report for review
    #[command(name = "merged-report")]
    MergedReport {
        /// Branch report to generate
        report_file: PathBuf,
    },

    /// Remove remote branches based on a reviewed branch report
    #[command(name = "guided-remove")]
    GuidedRemove {
        /// Report file to consume
        report_file: PathBuf,
    },

    /// Report remote branches whose newest commit is older than a threshold
    #[command(name = "old-branches")]
    OldBranches {
        /// Branch report to generate
        report_file: PathBuf,

        /// Age of the newest commit, in days
        #[arg(default_value_t = DEFAULT_AGE_DAYS)]
        age: i64,
    },
}
