//! Merged-branches report: remote branches already merged into the current
//! branch, minus the safe set. Read-only; the candidates are persisted for
//! human review before anything is deleted.

use std::path::PathBuf;

use async_trait::async_trait;

use super::branch_report::{write_report, BranchReportStatus};
use super::Action;
use crate::log_error;
use crate::log_info;
use crate::project::Project;
use crate::report::ReportLine;
use crate::scm::git::branch::RemoteBranch;

pub struct MergedBranchesReportAction {
    report_file: PathBuf,
}

impl MergedBranchesReportAction {
    pub fn new(report_file: impl Into<PathBuf>) -> Self {
        Self {
            report_file: report_file.into(),
        }
    }
}

const COLUMNS: &[&str] = &["Project", "Status", "# Candidates"];

fn line(project: &Project, status: BranchReportStatus, candidates: Vec<String>) -> ReportLine {
    ReportLine::new(&[
        ("Project", project.name.clone()),
        ("Status", status.as_str().to_string()),
        ("# Candidates", candidates.len().to_string()),
    ])
    .with_candidates(candidates)
}

async fn candidates(project: &Project) -> anyhow::Result<Vec<String>> {
    let repository = project.repository();
    repository.fetch().await?;
    let remote_branches = repository.remote_branches(true).await?;

    Ok(remote_branches
        .into_iter()
        .filter(|branch| {
            if project.is_safe_branch(branch) {
                return false;
            }
            let candidate = RemoteBranch::from_branch_name(branch);
            log_info!(
                "{}: candidate {} {}",
                project.name,
                candidate.remote,
                candidate.branch
            );
            true
        })
        .collect())
}

#[async_trait]
impl Action for MergedBranchesReportAction {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn act(&self, project: &Project) -> ReportLine {
        match candidates(project).await {
            Ok(candidates) => line(project, BranchReportStatus::Success, candidates),
            Err(e) => {
                log_error!("{}: {e}", project.name);
                line(project, BranchReportStatus::Failure, Vec::new())
            }
        }
    }

    fn skip_report(&self, project: &Project) -> ReportLine {
        line(project, BranchReportStatus::Skipped, Vec::new())
    }

    fn post(&self, lines: &[ReportLine]) -> anyhow::Result<()> {
        write_report(lines, &self.report_file)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::testing::project;
    use crate::scm::git::runner::testing::ScriptedRunner;

    #[tokio::test]
    async fn safe_branches_are_filtered_from_candidates() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .ok("git fetch --prune", "", "")
                .ok(
                    "git branch -r --merged",
                    "  origin/HEAD -> origin/master\n  origin/master\n  origin/test-branch\n",
                    "",
                ),
        );
        let project = project("demo", "master", runner);

        let action = MergedBranchesReportAction::new("unused.json");
        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "report-success");
        assert_eq!(row.get("# Candidates"), "1");
        assert_eq!(row.candidate_branches, vec!["origin/test-branch"]);
    }

    #[tokio::test]
    async fn fetch_failure_is_a_failure_row() {
        let runner =
            Arc::new(ScriptedRunner::new().fail("git fetch --prune", 128, "fatal: no remote"));
        let project = project("demo", "master", runner);

        let action = MergedBranchesReportAction::new("unused.json");
        let row = action.act(&project).await;
        assert_eq!(row.get("Status"), "report-failure");
        assert_eq!(row.get("# Candidates"), "0");
    }

    #[tokio::test]
    async fn post_persists_candidates_for_review() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.json");
        let action = MergedBranchesReportAction::new(&path);

        let lines = vec![ReportLine::new(&[("Project", "demo".to_string())])
            .with_candidates(vec!["origin/test-branch".to_string()])];
        action.post(&lines).unwrap();

        let records = crate::actions::read_report(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].branch, "origin/test-branch");
        assert!(!records[0].keep);
    }
}
