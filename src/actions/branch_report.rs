//! Durable branch-report records bridging the report and removal passes.
//!
//! A "candidates" pass writes one record per candidate branch; a human
//! flips `keep` on the branches to spare; the removal pass consumes the
//! file. The file is the only state that survives between invocations.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::log_info;
use crate::report::ReportLine;

/// Shared terminal states of the branch-report workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchReportStatus {
    Success,
    Failure,
    Skipped,
}

impl BranchReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "report-success",
            Self::Failure => "report-failure",
            Self::Skipped => "report-skip",
        }
    }
}

/// One reviewed instruction: whether `branch` in `project` should be kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchReportDetails {
    pub project: String,
    pub branch: String,
    pub keep: bool,
}

/// Persist every candidate branch as a `keep: false` record for review.
pub fn write_report(lines: &[ReportLine], path: &Path) -> Result<()> {
    let records: Vec<BranchReportDetails> = lines
        .iter()
        .flat_map(|line| {
            line.candidate_branches
                .iter()
                .map(|branch| BranchReportDetails {
                    project: line.get("Project").to_string(),
                    branch: branch.clone(),
                    keep: false,
                })
        })
        .collect();

    log_info!("generating branch report: {}", path.display());
    let text = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, text)
        .with_context(|| format!("unable to write branch report {}", path.display()))
}

/// Load a previously-generated report. A missing or malformed file is a
/// hard error: the removal pass refuses to guess.
pub fn read_report(path: &Path) -> Result<Vec<BranchReportDetails>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::BranchReport {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| ConfigError::BranchReport {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_candidates_for_review() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("branches.json");

        let lines = vec![
            ReportLine::new(&[("Project", "api".to_string())])
                .with_candidates(vec!["origin/old-1".to_string(), "origin/old-2".to_string()]),
            ReportLine::new(&[("Project", "web".to_string())]),
        ];
        write_report(&lines, &path).unwrap();

        let records = read_report(&path).unwrap();
        assert_eq!(
            records,
            vec![
                BranchReportDetails {
                    project: "api".to_string(),
                    branch: "origin/old-1".to_string(),
                    keep: false,
                },
                BranchReportDetails {
                    project: "api".to_string(),
                    branch: "origin/old-2".to_string(),
                    keep: false,
                },
            ]
        );
    }

    #[test]
    fn entries_for_other_projects_are_tolerated_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("branches.json");
        std::fs::write(
            &path,
            r#"[{"project": "other", "branch": "origin/x", "keep": true}]"#,
        )
        .unwrap();

        let records = read_report(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].keep);
    }

    #[test]
    fn missing_file_is_a_hard_error() {
        let err = read_report(Path::new("/nope/branches.json")).unwrap_err();
        assert!(matches!(err, ConfigError::BranchReport { .. }));
    }

    #[test]
    fn malformed_json_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("branches.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_report(&path).unwrap_err();
        assert!(matches!(err, ConfigError::BranchReport { .. }));
    }
}
