//! Cleanup: retire the current feature branch once its work has landed.

use async_trait::async_trait;

use super::Action;
use crate::error::ShellError;
use crate::log_error;
use crate::project::Project;
use crate::report::ReportLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStatus {
    Skipped,
    Dirty,
    Success,
    Failure,
}

impl CleanupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "clean-skip",
            Self::Dirty => "clean-dirty",
            Self::Success => "clean-success",
            Self::Failure => "clean-failure",
        }
    }
}

pub struct CleanupAction;

const COLUMNS: &[&str] = &["Project", "Branch", "Status"];

fn line(project: &Project, branch: &str, status: CleanupStatus) -> ReportLine {
    ReportLine::new(&[
        ("Project", project.name.clone()),
        ("Branch", branch.to_string()),
        ("Status", status.as_str().to_string()),
    ])
}

/// Checkout default → pull → drop the old branch → prune origin. Strictly
/// sequential; a failure leaves the earlier steps in place.
async fn retire(project: &Project, branch: &str) -> Result<(), ShellError> {
    let repository = project.repository();
    repository.select_branch(&project.default_branch).await?;
    repository.pull().await?;
    repository.delete_local_branch(branch).await?;
    repository.prune("origin").await?;
    Ok(())
}

#[async_trait]
impl Action for CleanupAction {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn act(&self, project: &Project) -> ReportLine {
        let status = match project.repository().status().await {
            Ok(status) => status,
            Err(e) => {
                log_error!("{}: {e}", project.name);
                return line(project, "", CleanupStatus::Failure);
            }
        };

        if status.branch == project.default_branch {
            return line(project, &status.branch, CleanupStatus::Skipped);
        }
        if !status.modified_files.is_empty() {
            return line(project, &status.branch, CleanupStatus::Dirty);
        }

        match retire(project, &status.branch).await {
            Ok(()) => line(project, &status.branch, CleanupStatus::Success),
            Err(e) => {
                log_error!("{}: {e}", project.name);
                line(project, &status.branch, CleanupStatus::Failure)
            }
        }
    }

    fn skip_report(&self, project: &Project) -> ReportLine {
        line(project, "", CleanupStatus::Skipped)
    }
}
