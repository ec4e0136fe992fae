//! Repository report: branch, modified-file count, and commit per project.
//!
//! Purely informative; never touches the network and never mutates. A
//! failing status query degrades to an empty row rather than a failure
//! status, so the table always shows every project.

use async_trait::async_trait;

use super::Action;
use crate::log_warning;
use crate::project::Project;
use crate::report::ReportLine;

pub struct RepositoryReportAction;

const COLUMNS: &[&str] = &["Project", "Branch", "# Mod", "Commit"];

fn line(project: &Project, branch: &str, modified: usize, commit: &str) -> ReportLine {
    ReportLine::new(&[
        ("Project", project.name.clone()),
        ("Branch", branch.to_string()),
        ("# Mod", modified.to_string()),
        ("Commit", commit.to_string()),
    ])
}

#[async_trait]
impl Action for RepositoryReportAction {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn act(&self, project: &Project) -> ReportLine {
        match project.repository().status().await {
            Ok(status) => line(
                project,
                &status.branch,
                status.modified_files.len(),
                &status.commit,
            ),
            Err(e) => {
                log_warning!("{}: {e}", project.name);
                line(project, "", 0, "")
            }
        }
    }

    fn skip_report(&self, project: &Project) -> ReportLine {
        line(project, "", 0, "")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::testing::project;
    use crate::scm::git::runner::testing::ScriptedRunner;

    #[tokio::test]
    async fn reports_branch_commit_and_modified_count() {
        let runner = Arc::new(ScriptedRunner::new().ok(
            "git status --porcelain=2 -b",
            "# branch.oid bdb09a93b8fcc5ce559287304f9e904f6464fcd5\n\
             # branch.head master\n\
             ? notes.txt\n",
            "",
        ));
        let project = project("demo", "master", runner);

        let row = RepositoryReportAction.act(&project).await;
        assert_eq!(row.get("Branch"), "master");
        assert_eq!(row.get("# Mod"), "1");
        assert_eq!(row.get("Commit"), "bdb09a93b8fc");
    }

    #[tokio::test]
    async fn status_failure_degrades_to_an_empty_row() {
        let runner =
            Arc::new(ScriptedRunner::new().fail("git status", 128, "fatal: not a git repository"));
        let project = project("demo", "master", runner);

        let row = RepositoryReportAction.act(&project).await;
        assert_eq!(row.get("Project"), "demo");
        assert_eq!(row.get("Branch"), "");
        assert_eq!(row.get("Commit"), "");
    }
}
