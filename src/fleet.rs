//! Runs an action across every configured project and renders the report.
//!
//! One task per repository: repositories never share state, so their
//! workflows overlap freely, while each workflow issues its own mutating
//! calls strictly in sequence. A hung subprocess stalls only its own row.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::actions::Action;
use crate::log_info;
use crate::report::{render_table, ReportRow};
use crate::selector::SelectedProject;

pub async fn run(action: Arc<dyn Action>, items: Vec<SelectedProject>) -> Result<()> {
    let timer = Instant::now();

    let mut handles = Vec::with_capacity(items.len());
    for item in &items {
        let action = Arc::clone(&action);
        let project = Arc::clone(&item.project);
        let selected = item.selected;
        handles.push(tokio::spawn(async move {
            if selected {
                action.act(&project).await
            } else {
                action.skip_report(&project)
            }
        }));
    }

    let mut lines = Vec::with_capacity(handles.len());
    for handle in handles {
        lines.push(handle.await.context("repository task failed")?);
    }

    let mut rows = Vec::with_capacity(lines.len());
    let mut current_group: Option<&str> = None;
    for (item, line) in items.iter().zip(&lines) {
        let group = item.project.group.as_deref();
        if group != current_group {
            if let Some(name) = group {
                rows.push(ReportRow::Separator(name.to_string()));
            }
            current_group = group;
        }
        rows.push(ReportRow::Line(line.clone()));
    }

    println!("{}", render_table(action.columns(), &rows));

    action.post(&lines)?;
    log_info!("{:.1}s elapsed", timer.elapsed().as_secs_f64());
    Ok(())
}
