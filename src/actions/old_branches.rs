//! Old-branches report: remote branches whose newest commit is older than
//! a threshold. Committer dates are queried concurrently; they read state
//! without mutating it.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use super::branch_report::{write_report, BranchReportStatus};
use super::Action;
use crate::log_error;
use crate::log_info;
use crate::log_warning;
use crate::project::Project;
use crate::report::ReportLine;
use crate::scm::git::branch::RemoteBranch;

pub const DEFAULT_AGE_DAYS: i64 = 60;

/// Replace a non-positive age with the default; never an error.
pub fn validate_age(age: i64) -> i64 {
    if age > 0 {
        age
    } else {
        log_warning!("invalid age {age}, using the default of {DEFAULT_AGE_DAYS} days");
        DEFAULT_AGE_DAYS
    }
}

pub struct OldBranchesReportAction {
    report_file: PathBuf,
    age_days: i64,
}

impl OldBranchesReportAction {
    pub fn new(report_file: impl Into<PathBuf>, age_days: i64) -> Self {
        Self {
            report_file: report_file.into(),
            age_days,
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

async fn candidates(project: &Project, age_days: i64) -> anyhow::Result<Vec<String>> {
    let repository = project.repository();
    repository.fetch().await?;
    let tracking_branches = repository.remote_branches(false).await?;

    let mut lookups = Vec::with_capacity(tracking_branches.len());
    for branch in tracking_branches {
        let repository = repository.clone();
        lookups.push(tokio::spawn(async move {
            let date = repository.committer_date(&branch).await;
            (branch, date)
        }));
    }

    let now = Utc::now();
    let mut candidates = Vec::new();
    for lookup in lookups {
        let (branch, date) = lookup.await?;
        let date = date?;
        let age = now.signed_duration_since(date).num_days();
        if age >= age_days {
            let candidate = RemoteBranch::from_branch_name(&branch);
            log_info!(
                "{}: candidate {} {} ({age} days)",
                project.name,
                candidate.remote,
                candidate.branch
            );
            candidates.push(branch);
        }
    }
    Ok(candidates)
}

#[async_trait]
impl Action for OldBranchesReportAction {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn act(&self, project: &Project) -> ReportLine {
        match candidates(project, self.age_days).await {
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
