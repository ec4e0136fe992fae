use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use muster::actions::{
    self, Action, CleanupAction, GuidedBranchRemovalAction, MergedBranchesReportAction,
    OldBranchesReportAction, RepositoryReportAction, SyncAction,
};
use muster::cli::{Cli, Command};
use muster::config;
use muster::fleet;
use muster::logging::{init_logging, LogLevel};
use muster::selector::{self, Selector, SelectorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LogLevel::parse(&cli.level).unwrap_or(LogLevel::Info));

    which::which("git").context("git was not found on PATH")?;

    // A bad report file must abort before any repository work starts.
    let action: Arc<dyn Action> = match &cli.command {
        Command::Sync => Arc::new(SyncAction),
        Command::Report => Arc::new(RepositoryReportAction),
        Command::Cleanup => Arc::new(CleanupAction),
        Command::MergedReport { report_file } => {
            Arc::new(MergedBranchesReportAction::new(report_file.clone()))
        }
        Command::GuidedRemove { report_file } => {
            Arc::new(GuidedBranchRemovalAction::new(report_file)?)
        }
        Command::OldBranches { report_file, age } => Arc::new(OldBranchesReportAction::new(
            report_file.clone(),
            actions::validate_age(*age),
        )),
    };

    let config_path = config::find_config_file(cli.config.as_deref())?;
    let projects = config::load_projects(&config_path)?;

    let selector = Selector::from_config(&SelectorConfig {
        projects: cli.projects.clone(),
        paths: cli.project_dirs.clone(),
        branch: cli.active_branch.clone().unwrap_or_default(),
        mark: cli.mark.clone().unwrap_or_default(),
    })?;
    let items = selector::select_projects(&selector, projects).await?;

    fleet::run(action, items).await
}
