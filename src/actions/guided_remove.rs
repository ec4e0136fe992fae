//! Guided branch removal: delete the remote branches a human reviewed.
//!
//! Consumes a branch report produced by the merged-branches or old-branches
//! pass. Branch names in the report may predate a fetch that silently
//! re-cased them, so candidates are resolved through the case map built
//! from this run's own fetch before any deletion is issued.

use std::path::Path;

use async_trait::async_trait;

use super::branch_report::{read_report, BranchReportDetails};
use super::Action;
use crate::error::ConfigError;
use crate::log_debug;
use crate::log_error;
use crate::log_info;
use crate::log_warning;
use crate::project::Project;
use crate::report::ReportLine;
use crate::scm::git::branch::{BranchCaseMap, RemoteBranch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidedBranchRemovalStatus {
    Success,
    Failure,
    Skipped,
    Dirty,
    Working,
}

impl GuidedBranchRemovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "guided-merge-success",
            Self::Failure => "guided-merge-failure",
            Self::Skipped => "guided-merge-skip",
            Self::Dirty => "guided-merge-dirty",
            Self::Working => "guided-merge-working",
        }
    }
}

pub struct GuidedBranchRemovalAction {
    instructions: Vec<BranchReportDetails>,
}

impl GuidedBranchRemovalAction {
    /// Load instructions up front: a missing or malformed report aborts the
    /// run before any repository work begins.
    pub fn new(report_file: &Path) -> Result<Self, ConfigError> {
        Ok(Self::with_instructions(read_report(report_file)?))
    }

    pub fn with_instructions(instructions: Vec<BranchReportDetails>) -> Self {
        Self { instructions }
    }
}

const COLUMNS: &[&str] = &["Project", "Branch", "Status", "# Kept", "# Removed", "# Failed"];

struct Counts {
    kept: usize,
    removed: usize,
    failed: usize,
}

const NO_COUNTS: Counts = Counts {
    kept: 0,
    removed: 0,
    failed: 0,
};

fn line(
    project: &Project,
    branch: &str,
    status: GuidedBranchRemovalStatus,
    counts: Counts,
) -> ReportLine {
    ReportLine::new(&[
        ("Project", project.name.clone()),
        ("Branch", branch.to_string()),
        ("Status", status.as_str().to_string()),
        ("# Kept", counts.kept.to_string()),
        ("# Removed", counts.removed.to_string()),
        ("# Failed", counts.failed.to_string()),
    ])
}

/// The report entries for one project, split into branches to keep and
/// branches to delete. Safe branches are re-checked here: configuration may
/// have changed since the report was generated.
struct RemovalPlan {
    kept: Vec<String>,
    to_remove: Vec<RemoteBranch>,
}

impl GuidedBranchRemovalAction {
    fn plan(&self, project: &Project) -> RemovalPlan {
        let mut kept = Vec::new();
        let mut to_remove = Vec::new();

        for instruction in &self.instructions {
            if instruction.project != project.name {
                continue;
            }
            if instruction.keep {
                log_info!("{}: keeping branch {}", project.name, instruction.branch);
                kept.push(instruction.branch.clone());
            } else if !project.is_safe_branch(&instruction.branch) {
                log_info!(
                    "{}: will attempt to remove branch {}",
                    project.name,
                    instruction.branch
                );
                to_remove.push(RemoteBranch::from_branch_name(&instruction.branch));
            }
        }

        RemovalPlan { kept, to_remove }
    }

    /// Fetch, reconcile casing, then issue one deletion per candidate
    /// concurrently. Individual failures are counted, not fatal.
    async fn remove(&self, project: &Project, plan: &RemovalPlan) -> anyhow::Result<(usize, usize)> {
        let repository = project.repository();
        let fetch = repository.fetch().await?;
        let case_map = BranchCaseMap::from_fetch(&fetch);

        let mut deletions = Vec::with_capacity(plan.to_remove.len());
        for target in &plan.to_remove {
            let resolved = case_map.resolve(target);
            log_debug!("{}: delete {} {}", project.name, resolved.remote, resolved.branch);
            let repository = repository.clone();
            deletions.push(tokio::spawn(async move {
                repository
                    .remove_remote_branch(&resolved.remote, &resolved.branch)
                    .await
            }));
        }

        let mut removed = 0;
        let mut failed = 0;
        for deletion in deletions {
            let outcome = deletion.await?;
            if outcome.deleted {
                log_info!("{}: deleted {} {}", project.name, outcome.remote, outcome.branch);
                removed += 1;
            } else {
                log_warning!(
                    "{}: failed to remove branch {} {}",
                    project.name,
                    outcome.remote,
                    outcome.branch
                );
                failed += 1;
            }
        }
        Ok((removed, failed))
    }
}

#[async_trait]
impl Action for GuidedBranchRemovalAction {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn act(&self, project: &Project) -> ReportLine {
        let plan = self.plan(project);

        let status = match project.repository().status().await {
            Ok(status) => status,
            Err(e) => {
                log_error!("{}: {e}", project.name);
                return line(project, "", GuidedBranchRemovalStatus::Failure, NO_COUNTS);
            }
        };

        if !status.modified_files.is_empty() {
            return line(project, &status.branch, GuidedBranchRemovalStatus::Dirty, NO_COUNTS);
        }
        if status.branch != project.default_branch {
            return line(project, &status.branch, GuidedBranchRemovalStatus::Working, NO_COUNTS);
        }
        if plan.to_remove.is_empty() {
            log_debug!("{}: no branches to remove", project.name);
            return line(project, &status.branch, GuidedBranchRemovalStatus::Skipped, NO_COUNTS);
        }

        match self.remove(project, &plan).await {
            Ok((removed, failed)) => line(
                project,
                &status.branch,
                GuidedBranchRemovalStatus::Success,
                Counts {
                    kept: plan.kept.len(),
                    removed,
                    failed,
                },
            ),
            Err(e) => {
                log_error!("{}: {e}", project.name);
                line(project, &status.branch, GuidedBranchRemovalStatus::Failure, NO_COUNTS)
            }
        }
    }

    fn skip_report(&self, project: &Project) -> ReportLine {
        line(project, "", GuidedBranchRemovalStatus::Skipped, NO_COUNTS)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::testing::project;
    use crate::scm::git::runner::testing::ScriptedRunner;

    fn instruction(project: &str, branch: &str, keep: bool) -> BranchReportDetails {
        BranchReportDetails {
            project: project.to_string(),
            branch: branch.to_string(),
            keep,
        }
    }

    #[tokio::test]
    async fn dirty_working_tree_issues_no_mutating_calls() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            "git status --porcelain=2 -b",
            "# branch.head master\n1 .M N... 100644 100644 100644 aaaaaaaa bbbbbbbb file.rs\n",
            "",
        ));
        let project = project("demo", "master", runner.clone());
        let action = GuidedBranchRemovalAction::with_instructions(vec![instruction(
            "demo",
            "origin/stale",
            false,
        )]);

        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "guided-merge-dirty");
        assert_eq!(row.get("# Kept"), "0");
        assert_eq!(row.get("# Removed"), "0");
        assert_eq!(row.get("# Failed"), "0");
        assert_eq!(runner.calls(), vec!["git status --porcelain=2 -b"]);
    }

    #[tokio::test]
    async fn off_default_branch_reports_working() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            "git status --porcelain=2 -b",
            "# branch.head feature-x\n",
            "",
        ));
        let project = project("demo", "master", runner);
        let action = GuidedBranchRemovalAction::with_instructions(vec![instruction(
            "demo",
            "origin/stale",
            false,
        )]);

        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "guided-merge-working");
    }

    #[tokio::test]
    async fn no_candidates_is_skipped() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            "git status --porcelain=2 -b",
            "# branch.head master\n",
            "",
        ));
        let project = project("demo", "master", runner);
        let action = GuidedBranchRemovalAction::with_instructions(vec![instruction(
            "demo",
            "origin/precious",
            true,
        )]);

        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "guided-merge-skip");
    }

    #[tokio::test]
    async fn deletions_use_the_re_cased_branch_name() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .ok(
                    "git status --porcelain=2 -b",
                    "# branch.head master\n",
                    "",
                )
                .ok(
                    "git fetch --prune",
                    "",
                    " - [deleted]         (none)        -> origin/Feature/Test\n \
                     * [new branch]      feature/test  -> origin/feature/test\n",
                )
                .ok("git push --delete origin feature/test", "", ""),
        );
        let project = project("demo", "master", runner.clone());
        let action = GuidedBranchRemovalAction::with_instructions(vec![instruction(
            "demo",
            "origin/Feature/Test",
            false,
        )]);

        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "guided-merge-success");
        assert_eq!(row.get("# Removed"), "1");
        assert_eq!(row.get("# Failed"), "0");
        assert!(runner
            .calls()
            .contains(&"git push --delete origin feature/test".to_string()));
    }

    #[tokio::test]
    async fn per_branch_failures_do_not_fail_the_workflow() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .ok(
                    "git status --porcelain=2 -b",
                    "# branch.head master\n",
                    "",
                )
                .ok("git fetch --prune", "", "")
                .ok("git push --delete origin gone", "", "")
                .fail("git push --delete origin protected", 1, "remote: denied"),
        );
        let project = project("demo", "master", runner);
        let action = GuidedBranchRemovalAction::with_instructions(vec![
            instruction("demo", "origin/gone", false),
            instruction("demo", "origin/protected", false),
            instruction("demo", "origin/precious", true),
            instruction("other-project", "origin/elsewhere", false),
        ]);

        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "guided-merge-success");
        assert_eq!(row.get("# Kept"), "1");
        assert_eq!(row.get("# Removed"), "1");
        assert_eq!(row.get("# Failed"), "1");
    }

    #[tokio::test]
    async fn safe_branches_are_never_removal_candidates() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            "git status --porcelain=2 -b",
            "# branch.head master\n",
            "",
        ));
        let project = project("demo", "master", runner.clone());
        // The default branch is implicitly safe, so the only instruction is
        // discarded and the workflow skips.
        let action = GuidedBranchRemovalAction::with_instructions(vec![instruction(
            "demo",
            "origin/master",
            false,
        )]);

        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "guided-merge-skip");
        assert_eq!(runner.calls(), vec!["git status --porcelain=2 -b"]);
    }
}
