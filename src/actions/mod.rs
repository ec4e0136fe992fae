//! Per-repository workflows.
//!
//! Each action runs independently against every selected project and yields
//! exactly one flat report row per project. Subprocess failures inside a
//! workflow become that row's failure status; they never abort the rest of
//! the fleet. Stages within a workflow are terminal: the first matching
//! condition decides the row.

mod branch_report;
mod cleanup;
mod guided_remove;
mod merged_branches;
mod old_branches;
mod report;
mod sync;

pub use branch_report::{read_report, write_report, BranchReportDetails, BranchReportStatus};
pub use cleanup::{CleanupAction, CleanupStatus};
pub use guided_remove::{GuidedBranchRemovalAction, GuidedBranchRemovalStatus};
pub use merged_branches::MergedBranchesReportAction;
pub use old_branches::{validate_age, OldBranchesReportAction, DEFAULT_AGE_DAYS};
pub use report::RepositoryReportAction;
pub use sync::{SyncAction, SyncStatus};

use anyhow::Result;
use async_trait::async_trait;

use crate::project::Project;
use crate::report::ReportLine;

/// A fleet-wide operation, applied to one repository at a time.
#[async_trait]
pub trait Action: Send + Sync {
    /// Column titles for the report table.
    fn columns(&self) -> &'static [&'static str];

    /// Run the workflow against one project.
    async fn act(&self, project: &Project) -> ReportLine;

    /// Row for a project the selector did not pick.
    fn skip_report(&self, project: &Project) -> ReportLine;

    /// Runs once after every project has reported, e.g. to persist a
    /// branch report.
    fn post(&self, lines: &[ReportLine]) -> Result<()> {
        let _ = lines;
        Ok(())
    }
}
