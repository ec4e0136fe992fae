//! Sync: fast-forward every clean repository.

use async_trait::async_trait;

use super::Action;
use crate::log_error;
use crate::project::Project;
use crate::report::ReportLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Success,
    Failure,
    Dirty,
    Skipped,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "sync-success",
            Self::Failure => "sync-fail",
            Self::Dirty => "sync-dirty",
            Self::Skipped => "sync-skipped",
        }
    }
}

pub struct SyncAction;

const COLUMNS: &[&str] = &["Project", "Branch", "Updated", "Status"];

fn line(project: &Project, branch: &str, updated: usize, status: SyncStatus) -> ReportLine {
    ReportLine::new(&[
        ("Project", project.name.clone()),
        ("Branch", branch.to_string()),
        ("Updated", updated.to_string()),
        ("Status", status.as_str().to_string()),
    ])
}

#[async_trait]
impl Action for SyncAction {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn act(&self, project: &Project) -> ReportLine {
        let repository = project.repository();

        let status = match repository.status().await {
            Ok(status) => status,
            Err(e) => {
                log_error!("{}: {e}", project.name);
                return line(project, "", 0, SyncStatus::Failure);
            }
        };

        if !status.modified_files.is_empty() {
            return line(project, &status.branch, 0, SyncStatus::Dirty);
        }

        match repository.pull().await {
            Ok(pull) => line(
                project,
                &status.branch,
                pull.updated_files.len(),
                SyncStatus::Success,
            ),
            Err(e) => {
                log_error!("{}: {e}", project.name);
                line(project, &status.branch, 0, SyncStatus::Failure)
            }
        }
    }

    fn skip_report(&self, project: &Project) -> ReportLine {
        line(project, "", 0, SyncStatus::Skipped)
    }
}
