//! Repository state reader: one method per git operation.
//!
//! Every method issues exactly one subprocess call and parses its output
//! into a typed result. Non-zero exits surface as [`ShellError`]; parsing
//! never fails, it degrades.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::ShellError;
use crate::log_debug;
use crate::scm::git::branch::RemoteBranch;
use crate::scm::git::parse;
use crate::scm::git::runner::{CommandRunner, ShellRunner};

/// Working-tree state at query time. May be stale immediately after a
/// concurrent mutation by another process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusResult {
    pub modified_files: Vec<String>,
    pub branch: String,
    pub remote_branch: String,
    /// Head commit id, run through the shortening policy.
    pub commit: String,
    pub ahead: u32,
    pub behind: u32,
}

/// Files touched by a fast-forward merge during a pull. An empty list is a
/// valid "already up to date" result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullResult {
    pub updated_files: Vec<String>,
}

/// Classification of the one-character flag on a fetch diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFlag {
    FastForward,
    ForcedUpdate,
    /// Local tracking ref removed because the remote branch no longer exists.
    Pruned,
    TagUpdate,
    /// A brand-new tracking ref was created.
    NewRef,
    Rejected,
    UpToDate,
    Unknown,
}

impl FetchFlag {
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            ' ' => Self::FastForward,
            '+' => Self::ForcedUpdate,
            '-' => Self::Pruned,
            't' => Self::TagUpdate,
            '*' => Self::NewRef,
            '!' => Self::Rejected,
            '=' => Self::UpToDate,
            _ => Self::Unknown,
        }
    }
}

/// One ref-update line from the fetch diagnostic stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchItem {
    pub flag: FetchFlag,
    /// The action label as printed, e.g. `[deleted]` or `6f8a3aa..bd2ac1c`.
    pub action: String,
    /// Source ref; `None` when git printed the `(none)` marker.
    pub remote_branch: Option<String>,
    pub tracking_branch: String,
}

/// Fetch items in the order git emitted them. Order matters: case
/// reconciliation pairs pruned and new-ref events from the same invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    pub updated_branches: Vec<FetchItem>,
}

/// Local and remote-tracking branches known to a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchListing {
    pub local: Vec<String>,
    pub remote: Vec<RemoteBranch>,
}

/// Outcome of a single remote-branch deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRemoteBranchResult {
    pub remote: String,
    pub branch: String,
    pub deleted: bool,
}

/// A local Git repository addressed through subprocess calls.
#[derive(Clone)]
pub struct GitRepository {
    runner: Arc<dyn CommandRunner>,
    commit_prefix: i32,
    prune_on_fetch: bool,
}

impl fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepository")
            .field("commit_prefix", &self.commit_prefix)
            .field("prune_on_fetch", &self.prune_on_fetch)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    pub fn open(path: &Path, commit_prefix: i32, prune_on_fetch: bool) -> Self {
        Self::with_runner(
            Arc::new(ShellRunner::new(path)),
            commit_prefix,
            prune_on_fetch,
        )
    }

    pub fn with_runner(
        runner: Arc<dyn CommandRunner>,
        commit_prefix: i32,
        prune_on_fetch: bool,
    ) -> Self {
        Self {
            runner,
            commit_prefix,
            prune_on_fetch,
        }
    }

    /// Working-tree status from the porcelain v2 branch-oriented format.
    pub async fn status(&self) -> Result<StatusResult, ShellError> {
        let out = self
            .runner
            .run(&["git", "status", "--porcelain=2", "-b"])
            .await?;
        Ok(parse::parse_status(&out.stdout, self.commit_prefix))
    }

    /// Head commit id, run through the shortening policy.
    pub async fn commit(&self) -> Result<String, ShellError> {
        let out = self.runner.run(&["git", "rev-parse", "HEAD"]).await?;
        Ok(parse::shorten_commit(out.stdout.trim(), self.commit_prefix))
    }

    /// Current local branch name.
    pub async fn branch(&self) -> Result<String, ShellError> {
        let out = self
            .runner
            .run(&["git", "rev-parse", "--abbrev-ref", "HEAD"])
            .await?;
        Ok(out.stdout.trim().to_string())
    }

    /// Fast-forward-only pull; fails when the merge would not be a
    /// fast-forward.
    pub async fn pull(&self) -> Result<PullResult, ShellError> {
        let out = if self.prune_on_fetch {
            self.runner
                .run(&["git", "pull", "--ff-only", "--prune"])
                .await?
        } else {
            self.runner.run(&["git", "pull", "--ff-only"]).await?
        };
        Ok(parse::parse_pull(&out.stdout))
    }

    /// Fetch with pruning; ref updates are reported on stderr.
    pub async fn fetch(&self) -> Result<FetchResult, ShellError> {
        let out = self.runner.run(&["git", "fetch", "--prune"]).await?;
        Ok(parse::parse_fetch(&out.stderr))
    }

    /// Remote-tracking branch names, optionally restricted to branches
    /// already merged into the current branch.
    pub async fn remote_branches(&self, merged: bool) -> Result<Vec<String>, ShellError> {
        let out = if merged {
            self.runner
                .run(&["git", "branch", "-r", "--merged"])
                .await?
        } else {
            self.runner.run(&["git", "branch", "-r"]).await?
        };
        Ok(parse::parse_remote_branches(&out.stdout))
    }

    /// Every branch the repository knows about, local and remote.
    pub async fn all_branches(&self) -> Result<BranchListing, ShellError> {
        let out = self.runner.run(&["git", "branch", "-a"]).await?;
        Ok(parse::parse_branch_listing(&out.stdout))
    }

    /// Committer timestamp of the newest commit reachable from `branch`.
    pub async fn committer_date(&self, branch: &str) -> Result<DateTime<Utc>, ShellError> {
        let out = self
            .runner
            .run(&["git", "log", "-n", "1", "--pretty=format:%cI", branch])
            .await?;
        let raw = out.stdout.trim();
        match DateTime::parse_from_rfc3339(raw) {
            Ok(date) => Ok(date.with_timezone(&Utc)),
            Err(_) => {
                // An unparseable timestamp degrades to "now": the branch
                // will never look old enough to retire.
                log_debug!("unparseable committer date for {branch}: {raw:?}");
                Ok(Utc::now())
            }
        }
    }

    /// Check out a local branch.
    pub async fn select_branch(&self, branch: &str) -> Result<(), ShellError> {
        self.runner.run(&["git", "checkout", branch]).await?;
        Ok(())
    }

    /// Delete a fully-merged local branch.
    pub async fn delete_local_branch(&self, branch: &str) -> Result<(), ShellError> {
        self.runner.run(&["git", "branch", "-d", branch]).await?;
        Ok(())
    }

    /// Drop local tracking refs whose remote branch is gone; returns the
    /// pruned branch names.
    pub async fn prune(&self, remote: &str) -> Result<Vec<String>, ShellError> {
        let out = self.runner.run(&["git", "remote", "prune", remote]).await?;
        Ok(parse::parse_pruned_branches(&out.stdout))
    }

    /// Delete a branch on the remote. Per-branch failures are reported in
    /// the result rather than as an error.
    pub async fn remove_remote_branch(&self, remote: &str, branch: &str) -> RemoveRemoteBranchResult {
        let deleted = self
            .runner
            .run(&["git", "push", "--delete", remote, branch])
            .await
            .is_ok();
        RemoveRemoteBranchResult {
            remote: remote.to_string(),
            branch: branch.to_string(),
            deleted,
        }
    }
}
