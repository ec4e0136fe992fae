//! Typed errors for the subprocess and configuration layers.
//!
//! Workflow code catches [`ShellError`] at the workflow boundary and turns
//! it into a failure row; [`ConfigError`] is fatal and aborts before any
//! repository work begins.

use std::path::PathBuf;
use thiserror::Error;

/// A subprocess exited with a non-zero status (or could not be spawned).
#[derive(Debug, Clone, Error)]
#[error("`{command}` exited with status {status}: {output}")]
pub struct ShellError {
    /// The command line that was executed.
    pub command: String,
    /// Exit status reported by the operating system; -1 when unavailable.
    pub status: i32,
    /// Combined stderr and stdout captured from the process.
    pub output: String,
}

/// Fatal configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {}: {reason}", .path.display())]
    UnreadableConfig { path: PathBuf, reason: String },

    #[error("invalid config file {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("no config file found (tried --config, ~/.muster.toml, ~/muster.toml)")]
    MissingConfig,

    #[error("invalid safe-branch pattern `{pattern}`: {reason}")]
    InvalidSafeBranch { pattern: String, reason: String },

    #[error("unable to read branch report {}: {reason}", .path.display())]
    BranchReport { path: PathBuf, reason: String },

    #[error(
        "conflicting selectors: projects={projects:?} paths={paths:?} branch={branch} mark={mark}"
    )]
    ConflictingSelectors {
        projects: Vec<String>,
        paths: Vec<String>,
        branch: String,
        mark: String,
    },

    #[error("no projects meet selection criteria: {criteria}")]
    NoProjectsSelected { criteria: String },
}
