//! Report rows and table rendering.
//!
//! Workflows hand the reporting layer flat rows of named string fields;
//! nothing nested ever crosses this boundary.

use std::collections::HashMap;

use console::style;
use tabled::builder::Builder;
use tabled::settings::Style;

/// One flat row of named string fields, plus the candidate-branch payload
/// carried by the branch-report workflows.
#[derive(Debug, Clone, Default)]
pub struct ReportLine {
    values: HashMap<String, String>,
    pub candidate_branches: Vec<String>,
}

impl ReportLine {
    pub fn new(values: &[(&str, String)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
            candidate_branches: Vec::new(),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidate_branches = candidates;
        self
    }

    /// Value for a column title; absent fields render empty.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A row in the final table: a project's report or a group separator.
#[derive(Debug, Clone)]
pub enum ReportRow {
    Line(ReportLine),
    Separator(String),
}

/// Render a bordered table with one row per report item.
pub fn render_table(columns: &[&str], rows: &[ReportRow]) -> String {
    let mut builder = Builder::new();
    builder.push_record(columns.iter().map(ToString::to_string));

    for row in rows {
        match row {
            ReportRow::Line(line) => {
                builder.push_record(columns.iter().map(|column| colorize(line.get(column))));
            }
            ReportRow::Separator(name) => {
                let mut cells = Vec::with_capacity(columns.len());
                cells.push(if name.is_empty() {
                    String::new()
                } else {
                    style(name).italic().bold().to_string()
                });
                cells.extend(columns.iter().skip(1).map(|_| String::new()));
                builder.push_record(cells);
            }
        }
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// Status cells share a suffix convention across workflows.
fn colorize(value: &str) -> String {
    if value.ends_with("-success") {
        style(value).green().to_string()
    } else if value.ends_with("-failure") || value.ends_with("-fail") {
        style(value).red().to_string()
    } else if value.ends_with("-dirty") {
        style(value).black().on_yellow().to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(project: &str, status: &str) -> ReportLine {
        ReportLine::new(&[
            ("Project", project.to_string()),
            ("Status", status.to_string()),
        ])
    }

    #[test]
    fn missing_fields_render_empty() {
        let row = line("demo", "sync-success");
        assert_eq!(row.get("Project"), "demo");
        assert_eq!(row.get("Branch"), "");
    }

    #[test]
    fn table_contains_headers_and_values() {
        let rows = vec![
            ReportRow::Separator("backend".to_string()),
            ReportRow::Line(line("api", "clean-skip")),
        ];
        let table = render_table(&["Project", "Status"], &rows);
        assert!(table.contains("Project"));
        assert!(table.contains("api"));
        assert!(table.contains("clean-skip"));
        assert!(table.contains("backend"));
    }

    #[test]
    fn every_project_gets_a_row() {
        let rows: Vec<ReportRow> = (0..3)
            .map(|i| ReportRow::Line(line(&format!("p{i}"), "sync-fail")))
            .collect();
        let table = render_table(&["Project", "Status"], &rows);
        for name in ["p0", "p1", "p2"] {
            assert!(table.contains(name));
        }
    }
}
